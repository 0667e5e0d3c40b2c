//! Built-in demo environment.
//!
//! Two functions, matching the default batch targets:
//!
//! - `demo-func-anom`   - 20 requests, several raising, 40-90 ms each, a
//!   resolvable execution role. Trips all three anomaly rules.
//! - `demo-func-normal` - 5 fast, clean requests. Its role no longer exists,
//!   so snapshots carry degraded role details.
//!
//! All data is fictional.

use serde_json::json;

use forensics_contracts::snapshot::{EnvironmentConfig, FunctionConfiguration, RoleRecord};

use crate::fixture::{Fixture, FixtureEvent, FunctionFixture};

pub const ANOMALOUS_FUNCTION: &str = "demo-func-anom";
pub const NORMAL_FUNCTION: &str = "demo-func-normal";

const ACCOUNT: &str = "123456789012";
const REGION: &str = "eu-north-1";

/// The default batch targets.
pub fn demo_functions() -> Vec<String> {
    vec![ANOMALOUS_FUNCTION.to_string(), NORMAL_FUNCTION.to_string()]
}

/// The demo environment as a fixture.
pub fn demo_fixture() -> Fixture {
    let mut fixture = Fixture::default();

    fixture.functions.insert(
        ANOMALOUS_FUNCTION.to_string(),
        FunctionFixture {
            configuration: configuration(ANOMALOUS_FUNCTION, "demo-func-anom-role", 128, 3),
            code: code_reference(ANOMALOUS_FUNCTION),
            events: anomalous_events(),
        },
    );
    fixture.functions.insert(
        NORMAL_FUNCTION.to_string(),
        FunctionFixture {
            configuration: configuration(NORMAL_FUNCTION, "legacy-demo-role", 256, 10),
            code: code_reference(NORMAL_FUNCTION),
            events: normal_events(),
        },
    );

    fixture.roles.insert(
        "demo-func-anom-role".to_string(),
        RoleRecord {
            arn: format!("arn:aws:iam::{}:role/service-role/demo-func-anom-role", ACCOUNT),
            create_date: "2025-11-03T09:14:27+00:00".to_string(),
            assume_role_policy_document: json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                    "Action": "sts:AssumeRole"
                }]
            }),
        },
    );

    fixture
}

fn configuration(name: &str, role: &str, memory: u64, timeout: u64) -> FunctionConfiguration {
    let mut environment = EnvironmentConfig::default();
    environment.variables.insert("STAGE".to_string(), "demo".to_string());
    environment.variables.insert("LOG_LEVEL".to_string(), "INFO".to_string());

    FunctionConfiguration {
        function_name: Some(name.to_string()),
        function_arn: Some(format!("arn:aws:lambda:{}:{}:function:{}", REGION, ACCOUNT, name)),
        runtime: Some("python3.12".to_string()),
        handler: Some("lambda_function.lambda_handler".to_string()),
        memory_size: Some(memory),
        timeout: Some(timeout),
        last_modified: Some("2026-01-12T10:41:05.000+0000".to_string()),
        description: Some(String::new()),
        role: Some(format!("arn:aws:iam::{}:role/service-role/{}", ACCOUNT, role)),
        environment: Some(environment),
        tracing_config: Some(json!({ "Mode": "PassThrough" })),
        vpc_config: None,
        revision_id: Some(format!("{}-rev-0007", name)),
        kms_key_arn: None,
        state: Some("Active".to_string()),
        package_type: Some("Zip".to_string()),
        architectures: Some(vec!["x86_64".to_string()]),
        ephemeral_storage: json!({ "Size": 512 }).as_object().cloned(),
    }
}

fn code_reference(name: &str) -> serde_json::Value {
    json!({
        "RepositoryType": "S3",
        "Location": format!("https://awslambda-{}-tasks.s3.{}.amazonaws.com/snapshots/{}/{}", REGION, REGION, ACCOUNT, name)
    })
}

/// Three lines per request: START, a body line, REPORT.
fn request(age: i64, id: usize, body: &str, duration: &str) -> Vec<FixtureEvent> {
    vec![
        FixtureEvent::aged(age, format!("START RequestId: req-{:04} Version: $LATEST", id)),
        FixtureEvent::aged(age, body.to_string()),
        FixtureEvent::aged(
            age,
            format!(
                "REPORT RequestId: req-{:04}\tDuration: {} ms\tBilled Duration: 100 ms\tMemory Size: 128 MB",
                id, duration
            ),
        ),
    ]
}

fn anomalous_events() -> Vec<FixtureEvent> {
    let mut events = Vec::new();
    for i in 0..20 {
        let age = 1500 - (i as i64) * 60;
        let body = match i % 5 {
            0 => "[ERROR] ZeroDivisionError: division by zero",
            3 => "Traceback (most recent call last): File \"/var/task/lambda_function.py\", line 7",
            _ => "processing order batch",
        };
        let duration = if i == 7 {
            "pending".to_string()
        } else {
            format!("{:.2}", 40.0 + (i as f64) * 2.5)
        };
        events.extend(request(age, i, body, &duration));
    }
    events
}

fn normal_events() -> Vec<FixtureEvent> {
    let mut events = Vec::new();
    for i in 0..5 {
        let duration = format!("{:.2}", 1.5 + (i as f64) * 0.25);
        events.extend(request(900 - (i as i64) * 120, 100 + i, "order accepted", &duration));
    }
    events
}
