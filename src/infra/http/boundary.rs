//! Page-level crash containment.
//!
//! A panic anywhere below the router is turned into the error page with a
//! retry and a way home instead of tearing down the connection.

use std::any::Any;

use axum::{
    body::Body,
    http::{Response, StatusCode},
};
use tower_http::catch_panic::ResponseForPanic;

use crate::{
    application::error::ErrorReport,
    presentation::views::{ErrorPageView, LayoutChrome, render_error_response},
};

const SOURCE: &str = "infra::http::boundary";

#[derive(Clone)]
pub struct PanicResponder {
    chrome: LayoutChrome,
}

impl PanicResponder {
    pub fn new(chrome: LayoutChrome) -> Self {
        Self { chrome }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let detail = panic_message(err.as_ref());
        render_error_response(
            self.chrome.clone(),
            ErrorPageView::crashed(),
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorReport::from_message(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, detail),
        )
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_string()
    }
}
