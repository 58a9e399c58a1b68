//! Ordered interceptor chains.
//!
//! A [`Chain`] is an ordered list of [`Interceptor`]s. Wrapped around a
//! terminal service it behaves like the hand-nested `A(B(C(handler)))`: the
//! first interceptor runs first on the way in and last on the way out.
//! Each interceptor receives a [`Next`] handle and either forwards the request
//! through it or answers on its own, which skips everything further in.
//!
//! `Chain` implements actix's `Transform`, so it is mounted with a single
//! `.wrap(chain)` on an `App`, `Scope` or `Resource`.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;

/// Future returned by every step of a chain.
pub type ChainFuture = LocalBoxFuture<'static, Result<ServiceResponse<BoxBody>, Error>>;

type Terminal = Rc<dyn Fn(ServiceRequest) -> ChainFuture>;

/// One step of a chain.
pub trait Interceptor: 'static {
    /// Stable name, used in logs and ordering assertions.
    fn name(&self) -> &'static str;

    /// Handle `req`, calling `next.call(req)` to continue inward.
    fn intercept(&self, req: ServiceRequest, next: Next) -> ChainFuture;
}

/// The remainder of a chain, from some position to the terminal handler.
#[derive(Clone)]
pub struct Next {
    interceptors: Rc<[Rc<dyn Interceptor>]>,
    position: usize,
    terminal: Terminal,
}

impl Next {
    pub fn call(self, req: ServiceRequest) -> ChainFuture {
        match self.interceptors.get(self.position) {
            Some(interceptor) => {
                let interceptor = Rc::clone(interceptor);
                let rest = Next {
                    interceptors: self.interceptors,
                    position: self.position + 1,
                    terminal: self.terminal,
                };
                interceptor.intercept(req, rest)
            }
            None => (self.terminal)(req),
        }
    }
}

/// Ordered list of interceptors, outermost first.
#[derive(Clone, Default)]
pub struct Chain {
    interceptors: Vec<Rc<dyn Interceptor>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor inside the ones already present.
    pub fn with<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Rc::new(interceptor));
        self
    }

    /// Append all of `inner`'s interceptors, in order, inside this chain's.
    pub fn then(mut self, inner: Chain) -> Self {
        self.interceptors.extend(inner.interceptors);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Wrap `terminal` with every interceptor and return the composed handler.
    pub fn compose<F>(&self, terminal: F) -> Next
    where
        F: Fn(ServiceRequest) -> ChainFuture + 'static,
    {
        self.compose_rc(Rc::new(terminal))
    }

    fn compose_rc(&self, terminal: Terminal) -> Next {
        Next {
            interceptors: self.interceptors.clone().into(),
            position: 0,
            terminal,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Chain
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = ChainMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let service = Rc::new(service);
        let inner = Rc::clone(&service);
        let terminal: Terminal = Rc::new(move |req| {
            let fut = inner.call(req);
            Box::pin(async move { fut.await.map(ServiceResponse::map_into_boxed_body) })
        });

        ready(Ok(ChainMiddleware {
            service,
            composed: self.compose_rc(terminal),
        }))
    }
}

pub struct ChainMiddleware<S> {
    service: Rc<S>,
    composed: Next,
}

impl<S, B> Service<ServiceRequest> for ChainMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = ChainFuture;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        self.composed.clone().call(req)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    // Renamed so `#[test]` inside `proptest!` stays the built-in attribute.
    use actix_web::{test as actix_test, web, App, HttpResponse};
    use proptest::prelude::*;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Interceptor for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn intercept(&self, req: ServiceRequest, next: Next) -> ChainFuture {
            let name = self.name;
            let log = Rc::clone(&self.log);
            Box::pin(async move {
                log.borrow_mut().push(format!("{name}:in"));
                let res = next.call(req).await;
                log.borrow_mut().push(format!("{name}:out"));
                res
            })
        }
    }

    /// Answers with 403 without calling inward.
    struct Gate;

    impl Interceptor for Gate {
        fn name(&self) -> &'static str {
            "gate"
        }

        fn intercept(&self, req: ServiceRequest, _next: Next) -> ChainFuture {
            Box::pin(async move { Ok(req.into_response(HttpResponse::Forbidden().finish())) })
        }
    }

    const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

    fn recorders(order: &[usize], log: &Log) -> Chain {
        order.iter().fold(Chain::new(), |chain, &i| {
            chain.with(Recorder {
                name: NAMES[i],
                log: Rc::clone(log),
            })
        })
    }

    fn terminal(log: Log) -> impl Fn(ServiceRequest) -> ChainFuture {
        move |req| {
            log.borrow_mut().push("handler".to_string());
            Box::pin(async move { Ok(req.into_response(HttpResponse::Ok().finish())) })
        }
    }

    fn expected(order: &[usize]) -> Vec<String> {
        let mut out: Vec<String> = order.iter().map(|&i| format!("{}:in", NAMES[i])).collect();
        out.push("handler".to_string());
        out.extend(order.iter().rev().map(|&i| format!("{}:out", NAMES[i])));
        out
    }

    #[actix_web::test]
    async fn first_interceptor_is_outermost() {
        let log: Log = Rc::default();
        let chain = recorders(&[0, 1, 2], &log);
        assert_eq!(chain.names(), vec!["a", "b", "c"]);

        let handler_log = Rc::clone(&log);
        let app = actix_test::init_service(App::new().wrap(chain).route(
            "/",
            web::get().to(move || {
                handler_log.borrow_mut().push("handler".to_string());
                async { HttpResponse::Ok().finish() }
            }),
        ))
        .await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
        assert!(resp.status().is_success());
        assert_eq!(*log.borrow(), expected(&[0, 1, 2]));
    }

    #[actix_web::test]
    async fn short_circuit_skips_inner_steps() {
        let log: Log = Rc::default();
        let chain = recorders(&[0], &log)
            .with(Gate)
            .then(recorders(&[1], &log));

        let composed = chain.compose(terminal(Rc::clone(&log)));
        let resp = composed
            .call(actix_test::TestRequest::default().to_srv_request())
            .await
            .unwrap();

        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
        assert_eq!(*log.borrow(), vec!["a:in", "a:out"]);
    }

    #[actix_web::test]
    async fn concatenation_matches_flat_chain() {
        let flat_log: Log = Rc::default();
        let flat = recorders(&[0, 1, 2, 3], &flat_log);

        let nested_log: Log = Rc::default();
        let nested = recorders(&[0, 1], &nested_log).then(recorders(&[2, 3], &nested_log));

        assert_eq!(flat.names(), nested.names());

        flat.compose(terminal(Rc::clone(&flat_log)))
            .call(actix_test::TestRequest::default().to_srv_request())
            .await
            .unwrap();
        nested
            .compose(terminal(Rc::clone(&nested_log)))
            .call(actix_test::TestRequest::default().to_srv_request())
            .await
            .unwrap();

        assert_eq!(*flat_log.borrow(), *nested_log.borrow());
    }

    #[actix_web::test]
    async fn empty_chain_calls_terminal_directly() {
        let log: Log = Rc::default();
        let chain = Chain::new();
        assert!(chain.is_empty());

        chain
            .compose(terminal(Rc::clone(&log)))
            .call(actix_test::TestRequest::default().to_srv_request())
            .await
            .unwrap();
        assert_eq!(*log.borrow(), vec!["handler"]);
    }

    proptest! {
        #[test]
        fn any_order_runs_in_then_reverse(order in Just((0..NAMES.len()).collect::<Vec<_>>()).prop_shuffle()) {
            let log: Log = Rc::default();
            let chain = recorders(&order, &log);
            let composed = chain.compose(terminal(Rc::clone(&log)));

            actix_web::rt::System::new().block_on(async move {
                composed
                    .call(actix_test::TestRequest::default().to_srv_request())
                    .await
                    .unwrap();
            });

            prop_assert_eq!(log.borrow().clone(), expected(&order));
        }
    }
}
