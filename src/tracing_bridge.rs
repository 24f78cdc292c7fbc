//! Forwards Bevy's `tracing` spans into Micromegas named scopes.
//!
//! With the `trace` feature Bevy opens a `schedule` span per schedule run.
//! [`ScopeBridgeLayer`] turns those into Micromegas scope events so the ghost
//! decision spans show up nested under the schedule that ran them.

use micromegas_tracing::dispatch::{on_begin_named_scope, on_end_named_scope};
use micromegas_tracing::intern_string::intern_string;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

micromegas_tracing::static_span_location!(BRIDGE_LOCATION);

struct BridgedScope {
    name: &'static str,
}

#[derive(Default)]
struct LabelVisitor {
    label: Option<String>,
}

impl Visit for LabelVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "name" {
            self.label = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "name" && self.label.is_none() {
            self.label = Some(format!("{:?}", value));
        }
    }
}

/// Bevy's span name for one schedule run.
const SCHEDULE_SPAN: &str = "schedule";

/// A `tracing_subscriber::Layer` that bridges Bevy schedule spans.
pub struct ScopeBridgeLayer;

impl<S> Layer<S> for ScopeBridgeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let kind = attrs.metadata().name();
        if kind != SCHEDULE_SPAN {
            return;
        }

        let mut visitor = LabelVisitor::default();
        attrs.record(&mut visitor);
        let label = match visitor.label {
            Some(label) => format!("{}:{}", kind, label),
            None => kind.to_string(),
        };

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(BridgedScope {
                name: intern_string(&label),
            });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let extensions = span.extensions();
            if let Some(scope) = extensions.get::<BridgedScope>() {
                on_begin_named_scope(&BRIDGE_LOCATION, scope.name);
            }
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let extensions = span.extensions();
            if let Some(scope) = extensions.get::<BridgedScope>() {
                on_end_named_scope(&BRIDGE_LOCATION, scope.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn entering_bridged_spans_is_harmless_without_a_sink() {
        let subscriber = Registry::default().with(ScopeBridgeLayer);
        tracing::subscriber::with_default(subscriber, || {
            let schedule = tracing::info_span!("schedule", name = "Update");
            let _outer = schedule.enter();
            let system = tracing::info_span!("system", name = "ghost_decisions");
            let _inner = system.enter();
            let other = tracing::info_span!("unrelated");
            let _ignored = other.enter();
        });
    }
}
