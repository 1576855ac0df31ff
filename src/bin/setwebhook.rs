// Registers `{WEBHOOK_URL}/api/webhook` with Telegram once and prints the raw answer.

use tinfobot_rs::{BoxError, trace::init_tracing, webhook::register_from_env};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), BoxError> {
    init_tracing();

    match register_from_env().await {
        Ok(reg) => {
            println!("{}", reg.body);
            if (200..300).contains(&reg.status) {
                Ok(())
            } else {
                Err(format!("setWebhook returned HTTP {}", reg.status).into())
            }
        }
        Err(e) => {
            error!("Webhook registration failed: {e}");
            Err(Box::new(e) as BoxError)
        }
    }
}
