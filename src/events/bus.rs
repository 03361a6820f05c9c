use super::types::{AfterExecutionEvent, BeforeExecutionEvent, Channel, CompiledSelector, EventSelector};
use crate::error::MetadataError;
use crate::middleware::Middleware;
use anyhow::Context;
use std::sync::Arc;
use tracing::debug;

/// An observer callback for events of type `E`.
pub type Listener<E> = Arc<dyn Fn(&mut E) -> anyhow::Result<()> + Send + Sync>;

struct Subscription<E> {
    name: String,
    selector: CompiledSelector,
    listener: Listener<E>,
}

/// Topic-routed publish/subscribe over the three execution channels.
///
/// Subscribers are evaluated in registration order; every matching subscriber
/// runs synchronously. On the before channel, delivery stops at the first
/// cancellation.
#[derive(Default)]
pub struct EventBus {
    before: Vec<Subscription<BeforeExecutionEvent>>,
    success: Vec<Subscription<AfterExecutionEvent>>,
    failure: Vec<Subscription<AfterExecutionEvent>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// [`MetadataError::Pattern`] if a selector pattern is invalid.
    pub fn on_before<F>(&mut self, name: &str, selector: EventSelector, listener: F) -> Result<(), MetadataError>
    where
        F: Fn(&mut BeforeExecutionEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let subscription = subscribe(name, &selector, Channel::Before, Arc::new(listener))?;
        self.before.push(subscription);
        Ok(())
    }

    /// # Errors
    ///
    /// [`MetadataError::Pattern`] if a selector pattern is invalid.
    pub fn on_success<F>(&mut self, name: &str, selector: EventSelector, listener: F) -> Result<(), MetadataError>
    where
        F: Fn(&mut AfterExecutionEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let subscription = subscribe(name, &selector, Channel::AfterSuccess, Arc::new(listener))?;
        self.success.push(subscription);
        Ok(())
    }

    /// # Errors
    ///
    /// [`MetadataError::Pattern`] if a selector pattern is invalid.
    pub fn on_failure<F>(&mut self, name: &str, selector: EventSelector, listener: F) -> Result<(), MetadataError>
    where
        F: Fn(&mut AfterExecutionEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let subscription = subscribe(name, &selector, Channel::AfterFailure, Arc::new(listener))?;
        self.failure.push(subscription);
        Ok(())
    }

    /// Subscribe `middleware` to all three channels.
    ///
    /// # Errors
    ///
    /// [`MetadataError::Pattern`] if a selector pattern is invalid.
    pub fn attach(
        &mut self,
        name: &str,
        selector: EventSelector,
        middleware: Arc<dyn Middleware>,
    ) -> Result<(), MetadataError> {
        let mw = Arc::clone(&middleware);
        self.on_before(name, selector.clone(), move |e| mw.before(e))?;
        let mw = Arc::clone(&middleware);
        self.on_success(name, selector.clone(), move |e| mw.on_success(e))?;
        self.on_failure(name, selector, move |e| middleware.on_failure(e))
    }

    #[must_use]
    pub fn subscription_count(&self, channel: Channel) -> usize {
        match channel {
            Channel::Before => self.before.len(),
            Channel::AfterSuccess => self.success.len(),
            Channel::AfterFailure => self.failure.len(),
        }
    }

    /// Deliver a before-event. Observer errors are returned untouched apart
    /// from context naming the observer.
    pub(crate) fn fire_before(&self, event: &mut BeforeExecutionEvent) -> anyhow::Result<()> {
        for sub in &self.before {
            if !sub.selector.matches(event.context()) {
                continue;
            }
            debug!(observer = %sub.name, channel = %Channel::Before, "Delivering event");
            (sub.listener)(event).with_context(|| format!("before-observer '{}'", sub.name))?;
            if event.is_canceled() {
                debug!(observer = %sub.name, "Call canceled by observer");
                break;
            }
        }
        Ok(())
    }

    /// Deliver an after-event on the channel its outcome selects.
    pub(crate) fn fire_after(&self, event: &mut AfterExecutionEvent) -> anyhow::Result<()> {
        let channel = event.channel();
        let subscriptions = match channel {
            Channel::AfterFailure => &self.failure,
            _ => &self.success,
        };
        for sub in subscriptions {
            if !sub.selector.matches(event.context()) {
                continue;
            }
            debug!(observer = %sub.name, channel = %channel, "Delivering event");
            (sub.listener)(event).with_context(|| format!("{channel} observer '{}'", sub.name))?;
        }
        Ok(())
    }
}

fn subscribe<E>(
    name: &str,
    selector: &EventSelector,
    channel: Channel,
    listener: Listener<E>,
) -> Result<Subscription<E>, MetadataError> {
    let compiled = selector.compile(&format!("{channel} observer '{name}'"))?;
    debug!(observer = %name, channel = %channel, "Observer subscribed");
    Ok(Subscription {
        name: name.to_string(),
        selector: compiled,
        listener,
    })
}
