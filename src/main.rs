#[tokio::main]
async fn main() {
    quill::start_server().await;
}
