use std::collections::HashMap;
use std::sync::Arc;

/// Thin StatsD client used by the API side. Tags are flattened into the
/// metric path since plain StatsD has no tag syntax.
#[derive(Clone)]
pub struct MetricsService {
    client: Arc<statsd::Client>,
}

impl MetricsService {
    pub fn new(host: &str, port: u16, prefix: &str) -> Self {
        let client = statsd::Client::new(format!("{}:{}", host, port), prefix)
            .expect("Failed to create StatsD client");

        Self {
            client: Arc::new(client),
        }
    }

    pub fn increment(&self, metric: &str, tags: Option<HashMap<String, String>>) {
        self.client.incr(&Self::with_tags(metric, tags));
    }

    pub fn timing(&self, metric: &str, millis: f64, tags: Option<HashMap<String, String>>) {
        self.client.timer(&Self::with_tags(metric, tags), millis);
    }

    fn with_tags(metric: &str, tags: Option<HashMap<String, String>>) -> String {
        let Some(tags) = tags else {
            return metric.to_string();
        };

        let mut pairs: Vec<_> = tags.into_iter().collect();
        pairs.sort();

        let mut name = metric.to_string();
        for (key, value) in pairs {
            name.push_str(&format!(".{}_{}", key, value));
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_flattened_deterministically() {
        let mut tags = HashMap::new();
        tags.insert("endpoint".to_string(), "upload".to_string());
        tags.insert("code".to_string(), "200".to_string());

        let name = MetricsService::with_tags("api_request", Some(tags));
        assert_eq!(name, "api_request.code_200.endpoint_upload");
    }

    #[test]
    fn no_tags_leaves_metric_untouched() {
        assert_eq!(MetricsService::with_tags("api_request", None), "api_request");
    }
}
