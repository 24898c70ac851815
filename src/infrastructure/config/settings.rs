use std::time::Duration;

use serde::Deserialize;

use crate::use_cases::dto::IntentSettings;
use crate::use_cases::poll_deposit_status::RetryPolicy;
use crate::use_cases::settle_payment::FeePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
	pub redis_url:                       String,
	pub worker_url:                      String,
	#[serde(default = "default_currency")]
	pub currency:                        String,
	#[serde(default = "default_server_port")]
	pub server_port:                     u16,
	#[serde(default = "default_server_keepalive")]
	pub server_keepalive:                u64,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms:                u64,
	#[serde(default = "default_poll_max_attempts")]
	pub poll_max_attempts:               u32,
	#[serde(default = "default_settlement_attempts")]
	pub settlement_attempts:             u32,
	#[serde(default = "default_status_timeout_ms")]
	pub status_timeout_ms:               u64,
	#[serde(default = "default_course_platform_fee_percent")]
	pub course_platform_fee_percent:     f64,
	#[serde(default = "default_fundraiser_platform_fee_percent")]
	pub fundraiser_platform_fee_percent: f64,
	#[serde(default = "default_min_donation")]
	pub min_donation:                    f64,
	#[serde(default = "default_max_donation")]
	pub max_donation:                    f64,
	#[serde(default = "default_confirmation_retention_secs")]
	pub confirmation_retention_secs:     u64,
}

fn default_currency() -> String {
	"CDF".to_string()
}

fn default_server_port() -> u16 {
	9999
}

fn default_server_keepalive() -> u64 {
	75
}

fn default_poll_interval_ms() -> u64 {
	3000
}

fn default_poll_max_attempts() -> u32 {
	20
}

fn default_settlement_attempts() -> u32 {
	3
}

fn default_status_timeout_ms() -> u64 {
	5000
}

fn default_course_platform_fee_percent() -> f64 {
	20.0
}

fn default_fundraiser_platform_fee_percent() -> f64 {
	5.0
}

fn default_min_donation() -> f64 {
	500.0
}

fn default_max_donation() -> f64 {
	500_000.0
}

fn default_confirmation_retention_secs() -> u64 {
	900
}

impl Config {
	pub fn load() -> Result<Self, config::ConfigError> {
		Self::load_with_prefix("APP")
	}

	pub fn load_with_prefix(prefix: &str) -> Result<Self, config::ConfigError> {
		let config_builder = config::Config::builder()
			.add_source(config::Environment::with_prefix(prefix))
			.build()?;

		config_builder.try_deserialize()
	}

	pub fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy::new(
			self.poll_max_attempts,
			Duration::from_millis(self.poll_interval_ms),
		)
	}

	pub fn fee_policy(&self) -> FeePolicy {
		FeePolicy {
			course_fee_percent:     self.course_platform_fee_percent,
			fundraiser_fee_percent: self.fundraiser_platform_fee_percent,
		}
	}

	pub fn intent_settings(&self) -> IntentSettings {
		IntentSettings {
			currency:     self.currency.clone(),
			min_donation: self.min_donation,
			max_donation: self.max_donation,
		}
	}

	pub fn status_timeout(&self) -> Duration {
		Duration::from_millis(self.status_timeout_ms)
	}

	pub fn confirmation_retention(&self) -> Duration {
		Duration::from_secs(self.confirmation_retention_secs)
	}
}

#[cfg(test)]
mod tests {
	use std::env;

	use super::*;

	#[test]
	fn test_config_load() {
		unsafe {
			env::set_var("CHECKOUT_FULL_REDIS_URL", "redis://test_redis/");
			env::set_var("CHECKOUT_FULL_WORKER_URL", "http://test_worker/");
			env::set_var("CHECKOUT_FULL_CURRENCY", "USD");
			env::set_var("CHECKOUT_FULL_SERVER_KEEPALIVE", "120");
			env::set_var("CHECKOUT_FULL_POLL_INTERVAL_MS", "500");
			env::set_var("CHECKOUT_FULL_POLL_MAX_ATTEMPTS", "4");
			env::set_var("CHECKOUT_FULL_COURSE_PLATFORM_FEE_PERCENT", "10");
			env::set_var("CHECKOUT_FULL_CONFIRMATION_RETENTION_SECS", "60");
		};

		let config =
			Config::load_with_prefix("CHECKOUT_FULL").expect("Failed to load config");

		assert_eq!(config.redis_url, "redis://test_redis/");
		assert_eq!(config.worker_url, "http://test_worker/");
		assert_eq!(config.currency, "USD");
		assert_eq!(config.server_keepalive, 120);
		assert_eq!(
			config.retry_policy(),
			RetryPolicy::new(4, Duration::from_millis(500))
		);
		assert_eq!(config.fee_policy().course_fee_percent, 10.0);
		assert_eq!(config.fee_policy().fundraiser_fee_percent, 5.0);
		assert_eq!(config.confirmation_retention(), Duration::from_secs(60));

		unsafe {
			env::remove_var("CHECKOUT_FULL_REDIS_URL");
			env::remove_var("CHECKOUT_FULL_WORKER_URL");
			env::remove_var("CHECKOUT_FULL_CURRENCY");
			env::remove_var("CHECKOUT_FULL_SERVER_KEEPALIVE");
			env::remove_var("CHECKOUT_FULL_POLL_INTERVAL_MS");
			env::remove_var("CHECKOUT_FULL_POLL_MAX_ATTEMPTS");
			env::remove_var("CHECKOUT_FULL_COURSE_PLATFORM_FEE_PERCENT");
			env::remove_var("CHECKOUT_FULL_CONFIRMATION_RETENTION_SECS");
		}
	}

	#[test]
	fn test_config_load_with_defaults() {
		unsafe {
			env::set_var("CHECKOUT_MIN_REDIS_URL", "redis://defaults/");
			env::set_var("CHECKOUT_MIN_WORKER_URL", "http://worker_defaults/");
		};

		let config =
			Config::load_with_prefix("CHECKOUT_MIN").expect("Failed to load config");

		assert_eq!(config.currency, "CDF");
		assert_eq!(config.server_port, 9999);
		assert_eq!(config.retry_policy(), RetryPolicy::default());
		assert_eq!(config.settlement_attempts, 3);
		assert_eq!(config.fee_policy(), FeePolicy::default());
		assert_eq!(config.intent_settings().min_donation, 500.0);
		assert_eq!(config.intent_settings().max_donation, 500_000.0);
		assert_eq!(
			config.confirmation_retention(),
			crate::use_cases::confirm_payment::DEFAULT_RETENTION
		);

		unsafe {
			env::remove_var("CHECKOUT_MIN_REDIS_URL");
			env::remove_var("CHECKOUT_MIN_WORKER_URL");
		}
	}

	#[test]
	fn test_config_requires_worker_url() {
		unsafe {
			env::set_var("CHECKOUT_NOWORKER_REDIS_URL", "redis://no_worker/");
		};

		assert!(Config::load_with_prefix("CHECKOUT_NOWORKER").is_err());

		unsafe {
			env::remove_var("CHECKOUT_NOWORKER_REDIS_URL");
		}
	}
}
