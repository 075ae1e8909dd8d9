//! Streaming response handling

use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use futures::Stream;

use crate::errors::Result;

/// Boxed stream of text fragments
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Streaming response from LLM
///
/// Finite and not restartable: once a fragment is yielded it is gone.
pub struct StreamingResponse {
    stream: FragmentStream,
}

impl StreamingResponse {
    pub fn new(stream: FragmentStream) -> Self {
        Self { stream }
    }

    /// Box any fragment stream
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<String>> + Send + 'static,
    {
        Self::new(Box::pin(stream))
    }
}

impl Stream for StreamingResponse {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }
}
