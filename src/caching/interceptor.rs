//! Interceptor Chain
//!
//! Ordered request/response hooks run around every handler. A request hook
//! may answer the request itself by returning [`Flow::ShortCircuit`]; the
//! handler is then skipped but response hooks still run.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Outcome of a request hook.
pub enum Flow {
    /// Continue with the next interceptor, then the handler
    Continue,
    /// Answer immediately with this response
    ShortCircuit(Response),
}

/// A pair of lifecycle hooks. Both default to doing nothing.
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Runs before the handler.
    ///
    /// Headers written to `reply` are added to the final response unless the
    /// response already carries them.
    async fn on_request(&self, _request: &HeaderMap, _reply: &mut HeaderMap) -> Flow {
        Flow::Continue
    }

    /// Runs after the handler (or short-circuit) and before the response is
    /// sent. Must not alter the body.
    async fn on_response(&self, _response: &mut Response) {}
}

/// Interceptors in registration order.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor to the end of the chain.
    pub fn with(mut self, interceptor: impl Interceptor) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Drives `request` through the chain and the downstream handler.
    pub async fn run(&self, request: Request, next: Next) -> Response {
        let mut reply = HeaderMap::new();

        for interceptor in &self.interceptors {
            if let Flow::ShortCircuit(response) =
                interceptor.on_request(request.headers(), &mut reply).await
            {
                return self.finish(response, reply).await;
            }
        }

        let response = next.run(request).await;
        self.finish(response, reply).await
    }

    async fn finish(&self, mut response: Response, reply: HeaderMap) -> Response {
        for (name, value) in reply.iter() {
            if !response.headers().contains_key(name) {
                response.headers_mut().insert(name.clone(), value.clone());
            }
        }

        for interceptor in &self.interceptors {
            interceptor.on_response(&mut response).await;
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        body::Body,
        http::{HeaderValue, StatusCode},
        middleware::from_fn,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    struct Tag(&'static str);

    #[async_trait]
    impl Interceptor for Tag {
        async fn on_request(&self, _request: &HeaderMap, reply: &mut HeaderMap) -> Flow {
            reply.insert("x-tag", HeaderValue::from_static(self.0));
            Flow::Continue
        }
    }

    struct Gate;

    #[async_trait]
    impl Interceptor for Gate {
        async fn on_request(&self, request: &HeaderMap, _reply: &mut HeaderMap) -> Flow {
            if request.contains_key("x-stop") {
                Flow::ShortCircuit(StatusCode::NOT_MODIFIED.into_response())
            } else {
                Flow::Continue
            }
        }
    }

    #[derive(Clone, Default)]
    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl Interceptor for Counter {
        async fn on_response(&self, _response: &mut Response) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn app(chain: InterceptorChain, handler_calls: Arc<AtomicUsize>) -> Router {
        let chain = Arc::new(chain);
        Router::new()
            .route(
                "/",
                get(move || {
                    let calls = handler_calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        "body"
                    }
                }),
            )
            .layer(from_fn(move |request: Request, next: Next| {
                let chain = chain.clone();
                async move { chain.run(request, next).await }
            }))
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler_but_runs_response_hooks() {
        let handler_calls = Arc::new(AtomicUsize::new(0));
        let counter = Counter::default();
        let chain = InterceptorChain::new()
            .with(Tag("first"))
            .with(Gate)
            .with(counter.clone());

        let response = app(chain, handler_calls.clone())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("x-stop", "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers().get("x-tag").unwrap(), "first");
        assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_continue_reaches_handler() {
        let handler_calls = Arc::new(AtomicUsize::new(0));
        let chain = InterceptorChain::new().with(Tag("first")).with(Gate);
        assert_eq!(chain.len(), 2);

        let response = app(chain, handler_calls.clone())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-tag").unwrap(), "first");
        assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_later_reply_header_wins_within_chain() {
        let chain = InterceptorChain::new().with(Tag("first")).with(Tag("second"));

        let response = app(chain, Arc::new(AtomicUsize::new(0)))
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("x-tag").unwrap(), "second");
    }
}
