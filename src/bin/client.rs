use anyhow::{Context, Result};
use chess_rooms::{
    client::{session::HELP, ClientSession, Command, Connection},
    identity::{sanitize_username, DEFAULT_USERNAME},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_rooms=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let relay_url =
        std::env::var("RELAY_URL").unwrap_or_else(|_| "ws://127.0.0.1:3000/ws".to_string());
    let username = sanitize_username(
        &std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
    );

    let mut connection = Connection::connect(&relay_url, &username)
        .await
        .with_context(|| format!("could not reach relay at {}", relay_url))?;
    let mut session = ClientSession::new(username.clone());

    println!("connected to {} as {}", relay_url, username);
    println!("{}", HELP);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                let response = session.execute(command);
                for line in &response.lines {
                    println!("{}", line);
                }
                if let Some(msg) = response.send {
                    connection.send(&msg).await?;
                }
                if response.quit {
                    break;
                }
            }
            msg = connection.next_message() => {
                let Some(msg) = msg? else {
                    println!("relay closed the connection");
                    return Ok(());
                };
                for line in session.handle_server_message(msg) {
                    println!("{}", line);
                }
            }
        }
    }

    connection.close().await?;
    Ok(())
}
