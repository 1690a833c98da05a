//! Middleware to read the caller identity and store it on the request objects

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::http::Response;
use axum::response::IntoResponse;
use common::{Error, IdentityError};
use tower::{Layer, Service};

use crate::Identity;

/// Middleware layer that guarantees a request carries an identity
///
/// If the identity headers are present and well formed an [`Identity`] is
/// stored as an [`Extension`](axum::Extension), controllers that need it
/// should ask for an [`Identity`] in their arguments
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityLayer;

impl IdentityLayer {
	#[must_use]
	pub fn new() -> Self { Self }
}

impl<S> Layer<S> for IdentityLayer {
	type Service = IdentityMiddleware<S>;

	fn layer(&self, inner: S) -> Self::Service { IdentityMiddleware { inner } }
}

#[derive(Clone)]
pub struct IdentityMiddleware<S> {
	inner: S,
}

impl<S> Service<Request<Body>> for IdentityMiddleware<S>
where
	S: Service<Request, Response = Response<Body>> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Error = S::Error;
	type Future = Pin<
		Box<
			dyn Future<Output = Result<Self::Response, Self::Error>>
				+ Send
				+ 'static,
		>,
	>;
	type Response = S::Response;

	fn poll_ready(
		&mut self,
		cx: &mut Context<'_>,
	) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	#[instrument(skip_all)]
	fn call(&mut self, mut req: Request<Body>) -> Self::Future {
		let cloned_inner = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, cloned_inner);

		Box::pin(async move {
			let identity = match Identity::from_headers(req.headers()) {
				Ok(Some(identity)) => identity,
				Ok(None) => {
					info!("got request without identity");

					return Ok(
						Error::from(IdentityError::MissingIdentity).into_response()
					);
				},
				Err(e) => return Ok(e.into_response()),
			};

			req.extensions_mut().insert(identity);

			inner.call(req).await
		})
	}
}
