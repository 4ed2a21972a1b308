/// Local server that prints every report posted by the extension

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> std::io::Result<()> {
    use env_logger::Env;
    use tab_reporter::receiver::{self, DEFAULT_RECEIVER_ADDR, ReceiverState};

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let listener = tokio::net::TcpListener::bind(DEFAULT_RECEIVER_ADDR).await?;
    receiver::serve(listener, receiver::router(ReceiverState::new())).await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
