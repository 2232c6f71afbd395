#[tokio::main]
async fn main() {
  if let Err(e) = nutrition_log_lib::run().await {
    eprintln!("nutrition-log failed: {}", e);
    std::process::exit(1);
  }
}
