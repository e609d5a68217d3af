//! # Integration Tests
//!
//! End-to-end scenarios against a local TCP endpoint.
//!
//! Covers:
//! - Immediate, size-triggered, deadline and explicit flushes
//! - Connection failures reaching the error listener
//! - Config loading through to a running client

#[cfg(test)]
mod support {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use contracts::SimpleMetric;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    pub const WAIT: Duration = Duration::from_secs(2);

    /// Accepts connections forever; each connection's bytes arrive as one payload
    pub struct MockEndpoint {
        pub endpoint: String,
        payloads: mpsc::UnboundedReceiver<String>,
    }

    impl MockEndpoint {
        pub async fn start() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let endpoint = listener.local_addr().unwrap().to_string();
            let (tx, payloads) = mpsc::unbounded_channel();

            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let mut payload = String::new();
                        if socket.read_to_string(&mut payload).await.is_ok() {
                            let _ = tx.send(payload);
                        }
                    });
                }
            });

            Self { endpoint, payloads }
        }

        pub async fn next_payload(&mut self) -> String {
            timeout(WAIT, self.payloads.recv())
                .await
                .expect("no payload received")
                .unwrap()
        }

        /// True if nothing arrives within `quiet`
        pub async fn is_quiet_for(&mut self, quiet: Duration) -> bool {
            timeout(quiet, self.payloads.recv()).await.is_err()
        }
    }

    /// An endpoint with nothing listening on it
    pub async fn closed_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();
        drop(listener);
        endpoint
    }

    pub fn metric_at(name: &str, secs: i64, nanos: u32) -> SimpleMetric {
        SimpleMetric::new(name).with_time(Utc.timestamp_opt(secs, nanos).unwrap())
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::{Duration, Instant};

    use config_loader::{ConfigFormat, ConfigLoader};
    use dispatcher::{CancellationToken, Client, DispatchError, SenderConfig};
    use tokio::sync::mpsc;
    use tokio::time::{sleep, timeout};

    use crate::support::{closed_endpoint, metric_at, MockEndpoint};

    fn record(n: i64) -> contracts::SimpleMetric {
        metric_at("metric_name", n, 0)
            .with_tag("tag1", "t1")
            .with_field("value1", n)
    }

    fn line(n: i64) -> String {
        format!("metric_name,tag1=t1 value1={n}i {n}000000000\n")
    }

    #[tokio::test]
    async fn test_unbatched_send_is_immediate() {
        let mut mock = MockEndpoint::start().await;
        let config = SenderConfig::new(&mock.endpoint);
        let client = Client::new(config, CancellationToken::new()).unwrap();

        client.send(record(1)).await;

        assert_eq!(
            mock.next_payload().await,
            "metric_name,tag1=t1 value1=1i 1000000000\n"
        );
        client.close().await;
    }

    #[tokio::test]
    async fn test_size_batch_sends_one_payload() {
        let mut mock = MockEndpoint::start().await;
        let config = SenderConfig::new(&mock.endpoint).with_batch_size(2);
        let client = Client::new(config, CancellationToken::new()).unwrap();

        client.send(record(1)).await;
        client.send(record(2)).await;

        assert_eq!(mock.next_payload().await, format!("{}{}", line(1), line(2)));
        assert!(mock.is_quiet_for(Duration::from_millis(200)).await);
        client.close().await;
    }

    #[tokio::test]
    async fn test_partial_batch_waits_for_explicit_flush() {
        let mut mock = MockEndpoint::start().await;
        let config = SenderConfig::new(&mock.endpoint).with_batch_size(2);
        let client = Client::new(config, CancellationToken::new()).unwrap();

        client.send(record(1)).await;
        assert!(mock.is_quiet_for(Duration::from_millis(200)).await);

        client.flush().await;
        assert_eq!(mock.next_payload().await, line(1));

        let stats = client.close().await;
        assert_eq!(stats.flush_count, 1);
        assert_eq!(stats.records_sent, 1);
    }

    #[tokio::test]
    async fn test_deadline_flush_not_before_timeout() {
        let mut mock = MockEndpoint::start().await;
        let timeout_ms = 100;
        let config = SenderConfig::new(&mock.endpoint)
            .with_batch_size(10)
            .with_batch_timeout(Duration::from_millis(timeout_ms));
        let client = Client::new(config, CancellationToken::new()).unwrap();

        let sent = Instant::now();
        client.send(record(1)).await;

        assert_eq!(mock.next_payload().await, line(1));
        assert!(sent.elapsed() >= Duration::from_millis(timeout_ms));
        client.close().await;
    }

    #[tokio::test]
    async fn test_connection_refused_reaches_listener_once() {
        let endpoint = closed_endpoint().await;
        let (tx, mut errors) = mpsc::unbounded_channel();
        let client = Client::builder(SenderConfig::new(endpoint))
            .error_listener(move |e: &DispatchError| {
                let _ = tx.send(e.kind());
            })
            .build()
            .unwrap();

        timeout(Duration::from_millis(100), client.send(record(1)))
            .await
            .expect("send must not wait for the network");

        let kind = timeout(Duration::from_secs(2), errors.recv()).await.unwrap();
        assert_eq!(kind, Some("connect"));

        let stats = client.close().await;
        assert_eq!(stats.flush_failures, 1);
        assert_eq!(stats.records_discarded, 1);
        assert_eq!(stats.records_sent, 0);
        // the listener was dropped with the client
        assert_eq!(errors.recv().await, None);
    }

    #[tokio::test]
    async fn test_explicit_flush_with_empty_batch_reports_dead_endpoint() {
        let endpoint = closed_endpoint().await;
        let (tx, mut errors) = mpsc::unbounded_channel();
        let client = Client::builder(SenderConfig::new(endpoint).with_batch_size(10))
            .error_listener(move |e: &DispatchError| {
                let _ = tx.send(e.kind());
            })
            .build()
            .unwrap();

        client.flush().await;

        let kind = timeout(Duration::from_secs(2), errors.recv()).await.unwrap();
        assert_eq!(kind, Some("connect"));

        let stats = client.close().await;
        assert_eq!(stats.flush_failures, 1);
        assert_eq!(stats.records_discarded, 0);
        assert_eq!(errors.recv().await, None);
    }

    #[tokio::test]
    async fn test_mixed_field_encoding() {
        let mut mock = MockEndpoint::start().await;
        let config = SenderConfig::new(&mock.endpoint);
        let client = Client::new(config, CancellationToken::new()).unwrap();

        let metric = crate::support::metric_at("metric_name", 3, 1)
            .with_tag("tag", "t1")
            .with_field("intField", 1)
            .with_field("floatField", 3.14);
        client.send(metric).await;

        assert_eq!(
            mock.next_payload().await,
            "metric_name,tag=t1 intField=1i,floatField=3.14 3000000001\n"
        );
        client.close().await;
    }

    #[tokio::test]
    async fn test_close_flushes_partial_batch() {
        let mut mock = MockEndpoint::start().await;
        let config = SenderConfig::new(&mock.endpoint).with_batch_size(100);
        let client = Client::new(config, CancellationToken::new()).unwrap();

        for n in 1..=3 {
            client.send(record(n)).await;
        }
        let stats = client.close().await;

        assert_eq!(
            mock.next_payload().await,
            format!("{}{}{}", line(1), line(2), line(3))
        );
        assert_eq!(stats.records_sent, 3);
    }

    #[tokio::test]
    async fn test_cancel_sends_nothing() {
        let mut mock = MockEndpoint::start().await;
        let token = CancellationToken::new();
        let config = SenderConfig::new(&mock.endpoint).with_batch_size(100);
        let client = Client::new(config, token.clone()).unwrap();

        client.send(record(1)).await;
        sleep(Duration::from_millis(20)).await;
        token.cancel();

        let stats = client.close().await;
        assert_eq!(stats.records_discarded, 1);
        assert!(mock.is_quiet_for(Duration::from_millis(200)).await);
    }

    #[tokio::test]
    async fn test_config_file_to_running_client() {
        let mut mock = MockEndpoint::start().await;
        let toml = format!("endpoint = \"{}\"\nbatch_size = 2\n", mock.endpoint);
        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let client = Client::new(config, CancellationToken::new()).unwrap();

        client.send(record(1)).await;
        client.send(record(2)).await;

        assert_eq!(mock.next_payload().await, format!("{}{}", line(1), line(2)));
        client.close().await;
    }
}
