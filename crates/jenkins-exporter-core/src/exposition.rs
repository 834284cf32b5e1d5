//! Prometheus metric families and text encoding

use std::collections::BTreeMap;

use prometheus::proto::{
    Gauge,
    LabelPair,
    Metric,
    MetricFamily,
    MetricType,
};
use prometheus::{
    Encoder,
    TextEncoder,
};

use crate::error::ExporterResult;
use crate::projection::{
    MetricKey,
    MetricSample,
};

pub const JOB_LABEL: &str = "jobname";

/// Groups samples into one gauge family per metric key.
///
/// Families with no samples are not produced. Repeated samples for the same
/// job stay as separate series entries, in projection order.
pub fn metric_families(samples: &[MetricSample]) -> Vec<MetricFamily> {
    let mut grouped: BTreeMap<MetricKey, Vec<&MetricSample>> = BTreeMap::new();
    for sample in samples {
        grouped.entry(sample.key).or_default().push(sample);
    }

    grouped
        .into_iter()
        .map(|(key, samples)| {
            let mut family = MetricFamily::default();
            family.set_name(key.name());
            family.set_help(key.help());
            family.set_field_type(MetricType::GAUGE);
            for sample in samples {
                family.mut_metric().push(gauge_metric(sample));
            }
            family
        })
        .collect()
}

fn gauge_metric(sample: &MetricSample) -> Metric {
    let mut label = LabelPair::default();
    label.set_name(JOB_LABEL.to_string());
    label.set_value(sample.label_value.clone());

    let mut gauge = Gauge::default();
    gauge.set_value(sample.value);

    let mut metric = Metric::default();
    metric.mut_label().push(label);
    metric.set_gauge(gauge);
    metric
}

pub fn encode_text(families: &[MetricFamily]) -> ExporterResult<String> {
    let mut buffer = String::new();
    TextEncoder::new().encode_utf8(families, &mut buffer)?;
    Ok(buffer)
}

/// Content type of `encode_text` output.
pub fn text_content_type() -> String {
    TextEncoder::new().format_type().to_string()
}
