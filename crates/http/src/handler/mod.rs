//! Request handlers invoked once a request has been fully assembled.
//!
//! A handler fills in the connection's [`Response`]; the server loop serializes and
//! writes it afterwards. Returning an error makes the server answer with its error
//! response instead.

use std::error::Error;
use std::sync::Arc;

use crate::protocol::{Request, Response};

pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    fn call(&self, request: &Request, response: &mut Response) -> Result<(), Self::Error>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    type Error = H::Error;

    fn call(&self, request: &Request, response: &mut Response) -> Result<(), Self::Error> {
        (**self).call(request, response)
    }
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F, Err> Handler for HandlerFn<F>
where
    F: Fn(&Request, &mut Response) -> Result<(), Err> + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
{
    type Error = Err;

    fn call(&self, request: &Request, response: &mut Response) -> Result<(), Self::Error> {
        (self.f)(request, response)
    }
}

pub fn make_handler<F, Err>(f: F) -> HandlerFn<F>
where
    F: Fn(&Request, &mut Response) -> Result<(), Err>,
    Err: Into<Box<dyn Error + Send + Sync>>,
{
    HandlerFn { f }
}
