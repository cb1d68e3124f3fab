use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use mockall::mock;
use std::collections::HashMap;

mock! {
    pub HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
    }
}

pub fn json_response(body: &str) -> HttpResponse {
    bytes_response(200, Bytes::from(body.to_string()))
}

pub fn status_response(status: u16) -> HttpResponse {
    bytes_response(status, Bytes::new())
}

pub fn bytes_response(status: u16, body: Bytes) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body,
    }
}
