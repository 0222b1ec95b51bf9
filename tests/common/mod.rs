//! Shared harness for integration tests.

#![allow(dead_code)]

pub mod harness {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use propmatch::cache::ResultCache;
    use propmatch::gateway::{HandlerState, create_router_with_state};
    use propmatch::model::{QaModel, QaTokenizer};
    use propmatch::pipeline::{Pipeline, ProcessOptions};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    pub struct TestServerConfig {
        pub cache_capacity: usize,
        pub n_best: usize,
        pub max_length: usize,
        pub doc_stride: usize,
        pub defaults: ProcessOptions,
    }

    impl Default for TestServerConfig {
        fn default() -> Self {
            Self {
                cache_capacity: 16,
                n_best: 20,
                max_length: 512,
                doc_stride: 128,
                defaults: ProcessOptions::default(),
            }
        }
    }

    pub struct TestServer {
        addr: SocketAddr,
        cache: Option<Arc<ResultCache>>,
        handle: JoinHandle<()>,
    }

    impl TestServer {
        pub fn url(&self) -> String {
            format!("http://{}", self.addr)
        }

        pub fn cache(&self) -> Option<&Arc<ResultCache>> {
            self.cache.as_ref()
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            self.handle.abort();
        }
    }

    /// Serves the stub tokenizer and stub scorer on an ephemeral port.
    pub async fn spawn_test_server(config: TestServerConfig) -> anyhow::Result<TestServer> {
        let tokenizer = QaTokenizer::stub(config.max_length, config.doc_stride);
        let mut pipeline = Pipeline::new(tokenizer, QaModel::stub(), config.n_best);

        let cache = (config.cache_capacity > 0)
            .then(|| Arc::new(ResultCache::new(config.cache_capacity)));
        if let Some(cache) = &cache {
            pipeline = pipeline.with_cache(cache.clone());
        }

        let state = HandlerState::new(pipeline, config.defaults, "test/stub".to_string());
        let app = create_router_with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(TestServer {
            addr,
            cache,
            handle,
        })
    }
}

pub mod http_client {
    use serde_json::Value;

    pub struct TestClient {
        base: String,
        client: reqwest::Client,
    }

    impl TestClient {
        pub fn new(base: String) -> Self {
            Self {
                base,
                client: reqwest::Client::new(),
            }
        }

        pub async fn get(&self, path: &str) -> anyhow::Result<(u16, Value)> {
            let res = self.client.get(format!("{}{}", self.base, path)).send().await?;
            Self::read(res).await
        }

        pub async fn delete(&self, path: &str) -> anyhow::Result<(u16, Value)> {
            let res = self
                .client
                .delete(format!("{}{}", self.base, path))
                .send()
                .await?;
            Self::read(res).await
        }

        pub async fn predict(&self, query: &str, body: &Value) -> anyhow::Result<(u16, Value)> {
            let res = self
                .client
                .post(format!("{}/predict{}", self.base, query))
                .json(body)
                .send()
                .await?;
            Self::read(res).await
        }

        async fn read(res: reqwest::Response) -> anyhow::Result<(u16, Value)> {
            let status = res.status().as_u16();
            let bytes = res.bytes().await?;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes)?
            };
            Ok((status, body))
        }
    }
}

pub mod fixtures {
    use serde_json::{Value, json};

    pub const WEATHER_SCHEMA: &str =
        "weather.temp weather.humidity location.city location.zip units api.key";

    pub fn single_query(schema: &str, query: &str) -> Value {
        json!({
            "schemas": [{
                "schemaId": "s1",
                "value": schema,
                "queries": [{"queryId": "q1", "value": query}]
            }]
        })
    }

    pub fn weather_request() -> Value {
        json!({
            "schemas": [{
                "schemaId": "weather",
                "name": "OpenWeather current",
                "value": WEATHER_SCHEMA,
                "queries": [
                    {"queryId": "city", "value": "name of the city"},
                    {"queryId": "zip", "value": "zip code", "verboseOutput": true},
                    {"queryId": "key", "value": "api key"}
                ]
            }]
        })
    }
}
