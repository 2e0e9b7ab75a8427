use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Script;
use tracing::info;

use super::{RateDecision, RateLimitError, RateLimitPolicy, RateLimiter};

/// INCR and first-hit EXPIRE run inside one script, so concurrent requests
/// for the same key can neither undercount nor leave a key without a TTL.
const FIXED_WINDOW_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
  redis.call('EXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('TTL', KEYS[1])
if ttl < 0 then
  redis.call('EXPIRE', KEYS[1], ARGV[1])
  ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

const KEY_PREFIX: &str = "ratelimit:";

/// Fixed-window limiter shared by every instance pointing at the same Redis.
pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    script: Script,
    policy: RateLimitPolicy,
}

impl RedisRateLimiter {
    pub async fn connect(redis_url: &str, policy: RateLimitPolicy) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis rate limiter connected");
        Ok(Self {
            conn,
            script: Script::new(FIXED_WINDOW_SCRIPT),
            policy,
        })
    }
}

/// Maps the script's `(count, ttl)` reply onto a decision.
fn decide(policy: &RateLimitPolicy, count: i64, ttl_secs: i64) -> RateDecision {
    let max = i64::from(policy.max_requests);
    if count > max {
        let ttl = u64::try_from(ttl_secs).unwrap_or(policy.window.as_secs());
        RateDecision::Limited {
            retry_after: Duration::from_secs(ttl),
        }
    } else {
        RateDecision::Allowed {
            remaining: u32::try_from(max - count).unwrap_or(0),
        }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> Result<RateDecision, RateLimitError> {
        let mut conn = self.conn.clone();
        let (count, ttl): (i64, i64) = self
            .script
            .key(format!("{KEY_PREFIX}{key}"))
            .arg(self.policy.window.as_secs().max(1))
            .invoke_async(&mut conn)
            .await?;
        Ok(decide(&self.policy, count, ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_allows_until_count_exceeds_max() {
        let policy = RateLimitPolicy::default();
        assert_eq!(
            decide(&policy, 1, 3600),
            RateDecision::Allowed { remaining: 4 }
        );
        assert_eq!(
            decide(&policy, 5, 1200),
            RateDecision::Allowed { remaining: 0 }
        );
        assert_eq!(
            decide(&policy, 6, 1200),
            RateDecision::Limited {
                retry_after: Duration::from_secs(1200)
            }
        );
    }

    #[test]
    fn test_decide_negative_ttl_falls_back_to_window() {
        let policy = RateLimitPolicy::default();
        assert_eq!(
            decide(&policy, 9, -1),
            RateDecision::Limited {
                retry_after: policy.window
            }
        );
    }
}
