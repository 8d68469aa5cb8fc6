use anyhow::Context;
use rdkafka::mocking::MockCluster;
use rdkafka::producer::DefaultProducerContext;

pub type TestCluster = MockCluster<'static, DefaultProducerContext>;

/// Starts an in-process single broker cluster with one-partition topics.
pub fn create_mock_cluster(topics: &[&str]) -> anyhow::Result<TestCluster> {
    let cluster = MockCluster::new(1).context("failed to create mock cluster")?;
    for topic in topics {
        cluster
            .create_topic(topic, 1, 1)
            .with_context(|| format!("failed to create topic {}", topic))?;
    }
    Ok(cluster)
}
