use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("store_whatsapp_statds")
        .with_description("Store WhatsApp webhook statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_webhook_event_statds(event: &str) {
    incr_statds("webhook_event".to_string(), event.into())
}

pub fn incr_outbound_message_statds(kind: &str, sent: bool) {
    let outcome = if sent { "sent" } else { "failed" };
    incr_statds("outbound_message".to_string(), format!("{kind}_{outcome}"))
}
