//! Interactive text-protocol client.
//!
//! Reads commands from stdin, validates them with the text codec, sends
//! them to the server, and prints every line the server pushes back
//! (acks, updates, errors) as it arrives.

use std::env;

use anyhow::Result;
use podsync_protocol::text_codec::{format_client, parse_client_line, parse_server_line};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<()> {
    // Where to connect: env override or default.
    let addr = env::var("PODSYNC_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:9100".to_string());

    println!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr).await?;
    println!("Connected.");
    println!("Type commands like:");
    println!("  join-pod, p1");
    println!("  join-booking, b1");
    println!("  update-pod, p1, OCCUPIED");
    println!("  leave-pod, p1");
    println!("  ping");
    println!("Type 'quit' or 'exit' to leave.\n");

    let (read_half, mut write_half) = stream.into_split();
    let mut server_lines = BufReader::new(read_half).lines();
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin_lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => {
                        println!("\nEOF on stdin, exiting client.");
                        break;
                    }
                };

                let trimmed = line.trim();
                if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
                    println!("Exiting client.");
                    break;
                }

                match parse_client_line(trimmed) {
                    Ok(Some(msg)) => {
                        let mut out = format_client(&msg);
                        out.push('\n');
                        write_half.write_all(out.as_bytes()).await?;
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("Could not parse command: {}", e),
                }
            }

            line = server_lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => {
                        println!("Server closed the connection.");
                        break;
                    }
                };

                match parse_server_line(&line) {
                    Ok(Some(msg)) => println!("<< {:?}", msg),
                    Ok(None) => {}
                    Err(e) => println!("<< {} (unparsed: {})", line, e),
                }
            }
        }
    }

    Ok(())
}
