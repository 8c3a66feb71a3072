//! Filter capabilities applied before and after the adapter.
//!
//! A filter mutates the message it is handed and either returns `Ok(())` or
//! a [`FilterError`]. The proxy stops at the first error, so a filter must not
//! assume it runs alone or last. Filters may see the same request more than
//! once when `to` is called repeatedly on a bound request.

use std::fmt;

use crate::proxy::{FilterError, ProxyRequest, ProxyResponse};

/// Transforms an outgoing request in place.
pub trait RequestFilter: Send + Sync {
    fn filter(&self, request: &mut ProxyRequest) -> Result<(), FilterError>;

    /// Identity reported when this filter fails.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Transforms an upstream response in place.
pub trait ResponseFilter: Send + Sync {
    fn filter(&self, response: &mut ProxyResponse) -> Result<(), FilterError>;

    /// Identity reported when this filter fails.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Adapts a closure into a named filter.
///
/// Implements [`RequestFilter`] when the closure takes `&mut ProxyRequest`
/// and [`ResponseFilter`] when it takes `&mut ProxyResponse`.
pub struct FnFilter<F> {
    name: String,
    f: F,
}

impl<F> FnFilter<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter").field("name", &self.name).finish()
    }
}

impl<F> RequestFilter for FnFilter<F>
where
    F: Fn(&mut ProxyRequest) -> Result<(), FilterError> + Send + Sync,
{
    fn filter(&self, request: &mut ProxyRequest) -> Result<(), FilterError> {
        (self.f)(request)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> ResponseFilter for FnFilter<F>
where
    F: Fn(&mut ProxyResponse) -> Result<(), FilterError> + Send + Sync,
{
    fn filter(&self, response: &mut ProxyResponse) -> Result<(), FilterError> {
        (self.f)(response)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
