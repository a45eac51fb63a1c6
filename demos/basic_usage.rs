//! Basic usage example for the Oasiz Chat library.
//!
//! This example routes a handful of messages through the dispatcher and
//! streams one reply chunk by chunk. No network access is needed: the
//! messages below hit offline tools and the simulated MCP servers.

use futures_util::StreamExt;
use oasiz_chat::config::get_config;
use oasiz_chat::{Dispatcher, StreamChunk, StreamEmitter};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = get_config();
    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);

    println!(
        "Registered tools: {}\n",
        dispatcher.registry().ids().collect::<Vec<_>>().join(", ")
    );

    let messages = [
        "tell me a joke",
        "what time is it?",
        "git status",
        "read notes.txt",
        "let's play rock paper scissors",
    ];

    for message in messages {
        let envelope = dispatcher.dispatch("demo", message).await;
        println!("> {}", message);
        println!("  [{}] {}\n", envelope.origin, envelope.text());
    }

    // Stream a reply
    let emitter = StreamEmitter::new(dispatcher.clone());
    let mut chunks = emitter.stream("demo", "I need some motivation");
    print!("> I need some motivation\n  ");
    while let Some(chunk) = chunks.next().await {
        match chunk {
            StreamChunk::Text(text) => print!("{}", text),
            StreamChunk::Done => break,
        }
    }
    println!("\n");

    println!(
        "Session 'demo' now holds {} messages",
        dispatcher.log().session("demo").len()
    );

    Ok(())
}
