use std::sync::Arc;

use deposit_checkout::infrastructure::config::settings::Config;
use deposit_checkout::run;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
	let config = Arc::new(Config::load().map_err(std::io::Error::other)?);
	run(config).await
}
