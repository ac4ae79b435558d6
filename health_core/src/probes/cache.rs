use crate::error::{CheckError, ConfigError};
use crate::health::{Probe, ProbeResult};
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Redis handle whose connection manager is established once and then shared.
///
/// Until the first connect succeeds the handle reports "Not connected". After
/// that a dropped socket fails the next command and the manager reconnects in
/// the background, so a restarted Redis is picked up without a process restart.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
    connection: Arc<OnceCell<ConnectionManager>>,
    connect_timeout: Duration,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("connected", &self.is_connected())
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl RedisCache {
    pub fn open(url: &str, connect_timeout: Duration) -> Result<Self, ConfigError> {
        if url.trim().is_empty() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        let client = redis::Client::open(url).map_err(|e| ConfigError::Invalid {
            key: "REDIS_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            connection: Arc::new(OnceCell::new()),
            connect_timeout,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    pub async fn connect(&self) -> Result<(), CheckError> {
        self.connection
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone());
                match tokio::time::timeout(self.connect_timeout, manager).await {
                    Ok(result) => result.map_err(CheckError::from),
                    Err(_) => Err(CheckError::Timeout),
                }
            })
            .await?;

        info!("Connected to Redis");
        Ok(())
    }

    /// Retries [`RedisCache::connect`] in the background until it succeeds.
    pub fn spawn_connect(&self, retry_interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            loop {
                match cache.connect().await {
                    Ok(()) => break,
                    Err(e) => {
                        warn!("Redis connection error: {}; retrying in {:?}", e, retry_interval);
                        tokio::time::sleep(retry_interval).await;
                    }
                }
            }
        })
    }

    pub async fn ping(&self) -> Result<(), CheckError> {
        let Some(connection) = self.connection.get() else {
            return Err(CheckError::connection("Not connected"));
        };

        let mut connection = connection.clone();
        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;

        if pong == "PONG" {
            debug!("Redis ping succeeded");
            Ok(())
        } else {
            Err(CheckError::protocol(format!("unexpected PING reply: {}", pong)))
        }
    }
}

pub struct CacheProbe {
    cache: RedisCache,
}

impl CacheProbe {
    pub fn new(cache: RedisCache) -> Self {
        Self { cache }
    }
}

#[async_trait::async_trait]
impl Probe for CacheProbe {
    async fn check(&self) -> ProbeResult {
        self.cache.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinSet;

    /// Minimal RESP server: `+PONG` for PING, `+OK` for anything else.
    /// Aborting the returned handle drops the listener and every open connection.
    fn spawn_resp_server(listener: TcpListener) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut connections = JoinSet::new();
            while let Ok((stream, _)) = listener.accept().await {
                connections.spawn(serve_resp(stream));
            }
        })
    }

    async fn serve_resp(mut stream: TcpStream) {
        let mut pending = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            pending.extend_from_slice(&chunk[..n]);

            while let Some((command, consumed)) = parse_command(&pending) {
                pending.drain(..consumed);
                let reply: &[u8] = if command.eq_ignore_ascii_case("PING") {
                    b"+PONG\r\n"
                } else {
                    b"+OK\r\n"
                };
                if stream.write_all(reply).await.is_err() {
                    return;
                }
            }
        }
    }

    /// Parses one complete `*N` array of bulk strings, returning its first
    /// element and the number of bytes consumed.
    fn parse_command(buf: &[u8]) -> Option<(String, usize)> {
        fn line(buf: &[u8], at: usize) -> Option<(&[u8], usize)> {
            let end = buf[at..].windows(2).position(|w| w == b"\r\n")? + at;
            Some((&buf[at..end], end + 2))
        }

        fn number(text: &[u8], marker: u8) -> Option<usize> {
            let (first, digits) = text.split_first()?;
            if *first != marker {
                return None;
            }
            std::str::from_utf8(digits).ok()?.parse().ok()
        }

        let (header, mut at) = line(buf, 0)?;
        let count = number(header, b'*')?;

        let mut first = None;
        for _ in 0..count {
            let (len_line, next) = line(buf, at)?;
            let len = number(len_line, b'$')?;
            if buf.len() < next + len + 2 {
                return None;
            }
            if first.is_none() {
                first = Some(String::from_utf8_lossy(&buf[next..next + len]).into_owned());
            }
            at = next + len + 2;
        }

        Some((first.unwrap_or_default(), at))
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let err = RedisCache::open("", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("REDIS_URL")));
    }

    #[test]
    fn test_malformed_url_is_config_error() {
        let err = RedisCache::open("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "REDIS_URL", .. }));
    }

    #[tokio::test]
    async fn test_unconnected_cache_fails_probe() {
        let cache = RedisCache::open("redis://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        assert!(!cache.is_connected());

        let probe = CacheProbe::new(cache);
        let err = probe.check().await.unwrap_err();
        assert_eq!(err, CheckError::connection("Not connected"));
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_cache_unconnected() {
        let cache = RedisCache::open("redis://127.0.0.1:1", Duration::from_millis(500)).unwrap();

        assert!(cache.connect().await.is_err());
        assert!(!cache.is_connected());
        assert!(cache.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_cache_recovers_after_server_restart() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = spawn_resp_server(listener);

        let url = format!("redis://{}", addr);
        let cache = RedisCache::open(&url, Duration::from_secs(2)).unwrap();
        cache.connect().await.unwrap();
        let probe = CacheProbe::new(cache);
        assert_eq!(probe.check().await, Ok(()));

        server.abort();
        let _ = server.await;

        let listener = TcpListener::bind(addr).await.unwrap();
        let _server = spawn_resp_server(listener);

        // The first command after the restart may still see the dropped socket.
        let mut recovered = false;
        for _ in 0..20 {
            if probe.check().await.is_ok() {
                recovered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(recovered, "cache check should pass again once Redis is back");
    }
}
