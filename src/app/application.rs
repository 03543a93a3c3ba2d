//! Request dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, info};

use crate::app::config::AppConfig;
use crate::app::error::Error;
use crate::app::handler::{Context, ErrorHandlerFn, HandlerFn, Outcome};
use crate::app::request::Environ;
use crate::app::response::{Body, ResponseParts};
use crate::app::status::StatusCode;
use crate::routing::{Method, Router};

/// A web application: a route table plus error pages.
///
/// Routes and error handlers are registered during setup; afterwards
/// [`Application::handle`] only reads them, so a fully configured
/// application can be shared between threads.
pub struct Application {
    /// The application configuration.
    pub config: AppConfig,
    router: Router<HandlerFn>,
    error_handlers: HashMap<u16, ErrorHandlerFn>,
    fallback_error_handler: Option<ErrorHandlerFn>,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    /// Create an application with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create an application with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            error_handlers: HashMap::new(),
            fallback_error_handler: None,
        }
    }

    /// Add a route for any HTTP method.
    ///
    /// A broken pattern is reported here, before the application serves
    /// anything.
    pub fn route<F>(&mut self, method: &str, pattern: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(&mut Context) -> Result<Outcome, Error> + Send + Sync + 'static,
    {
        let method: Method = method.parse()?;
        let handler: HandlerFn = Arc::new(handler);
        self.router.add(method, pattern, handler)?;
        Ok(())
    }

    /// Add a route for GET requests.
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(&mut Context) -> Result<Outcome, Error> + Send + Sync + 'static,
    {
        self.route("GET", pattern, handler)
    }

    /// Add a route for POST requests.
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(&mut Context) -> Result<Outcome, Error> + Send + Sync + 'static,
    {
        self.route("POST", pattern, handler)
    }

    /// Add a route for PUT requests.
    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(&mut Context) -> Result<Outcome, Error> + Send + Sync + 'static,
    {
        self.route("PUT", pattern, handler)
    }

    /// Add a route for DELETE requests.
    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(&mut Context) -> Result<Outcome, Error> + Send + Sync + 'static,
    {
        self.route("DELETE", pattern, handler)
    }

    /// Set the error page handler for one status code.
    pub fn error<F>(&mut self, status: u16, handler: F)
    where
        F: Fn(&mut Context) -> Result<Body, Error> + Send + Sync + 'static,
    {
        self.error_handlers.insert(status, Arc::new(handler));
    }

    /// Set the error page handler used when no status-specific one exists.
    pub fn fallback_error<F>(&mut self, handler: F)
    where
        F: Fn(&mut Context) -> Result<Body, Error> + Send + Sync + 'static,
    {
        self.fallback_error_handler = Some(Arc::new(handler));
    }

    /// Respond to a request.
    ///
    /// Handler failures and handler contract violations are returned as
    /// errors; requests that match no route yield 404, or 501 when no
    /// route exists for the method at all.
    pub fn handle(&self, environ: Environ) -> Result<ResponseParts, Error> {
        let mut ctx = Context::new(environ, &self.config);
        let method = ctx.request.method.parse::<Method>().ok();

        let resolved = method
            .as_ref()
            .and_then(|m| self.router.resolve(m, &ctx.request.path));

        match resolved {
            Some(resolution) => {
                let handler = Arc::clone(resolution.handler);
                ctx.args = resolution.args;
                let outcome = handler(&mut ctx)?;
                self.apply_outcome(&mut ctx, outcome)?;
            }
            None => {
                let known = method.as_ref().is_some_and(|m| self.router.contains_method(m));
                ctx.response.status = if known {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::NOT_IMPLEMENTED
                };
                debug!(
                    "No route for {} {}, responding {}",
                    ctx.request.method,
                    ctx.request.path,
                    ctx.response.status
                );
                let body = self.error_page(&mut ctx)?;
                ctx.response.body = Some(body);
            }
        }

        info!(
            "{} {} -> {}",
            ctx.request.method,
            ctx.request.path,
            ctx.response.status.as_u16()
        );
        Ok(ctx.response.finish())
    }

    /// Interpret a handler's outcome into the response.
    fn apply_outcome(&self, ctx: &mut Context, outcome: Outcome) -> Result<(), Error> {
        match outcome {
            Outcome::Body(body) => {
                ctx.response.body = Some(body);
            }
            Outcome::Status(code) => {
                ctx.response.status = self.known_status(ctx, code)?;
                if ctx.response.body.is_none() {
                    ctx.response.body = Some(self.error_page(ctx)?);
                }
            }
            Outcome::Redirect(code, location) => {
                let status = self.known_status(ctx, code)?;
                if !status.is_redirect() {
                    return Err(self.contract_violation(
                        ctx,
                        format!("redirect status {code} is outside 300-308"),
                    ));
                }
                ctx.response.add_header("Location", location);
                ctx.response.status = status;
                if ctx.response.body.is_none() {
                    ctx.response.body = Some(self.error_page(ctx)?);
                }
            }
        }
        Ok(())
    }

    fn known_status(&self, ctx: &Context, code: u16) -> Result<StatusCode, Error> {
        StatusCode::from_u16(code)
            .ok_or_else(|| self.contract_violation(ctx, format!("unknown status code {code}")))
    }

    fn contract_violation(&self, ctx: &Context, reason: String) -> Error {
        let message = format!(
            "handler for {} {} returned an invalid value: {reason}",
            ctx.request.method, ctx.request.path
        );
        error!("{message}");
        Error::HandlerContract(message)
    }

    /// Produce the error page body for the current status.
    ///
    /// A handler registered for the exact status wins over the fallback
    /// handler; without either, a plain-text status line is used.
    fn error_page(&self, ctx: &mut Context) -> Result<Body, Error> {
        let handler = self
            .error_handlers
            .get(&ctx.response.status.as_u16())
            .or(self.fallback_error_handler.as_ref());

        match handler {
            Some(handler) => handler(ctx),
            None => {
                ctx.response.media_type = "text/plain".to_string();
                Ok(Body::Text(ctx.response.status_line()))
            }
        }
    }
}
