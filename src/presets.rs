//! Built-in dashboard modules and the named functions they reference

use crate::binding::transform::{get_nested_value, parse_date};
use crate::binding::{
    BindingError, Computation, CustomTransform, DataSourceConfig, ModuleDescriptor, SourceKind,
    TransformSpec,
};
use chrono::Local;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

pub mod module_ids {
    pub const FACTORY_OVERVIEW: &str = "factoryOverview";
    pub const ALERT_DATA: &str = "alertData";
    pub const STAFF_DISTRIBUTION: &str = "staffDistribution";
    pub const MONITORING_POINTS: &str = "monitoringPoints";
    pub const ALERT_HISTORY: &str = "alertHistory";
    pub const BEHAVIOR_STATS: &str = "behaviorStats";
    pub const LIVE_MONITORS: &str = "liveMonitors";
    pub const PROJECT_QUEUE: &str = "projectQueue";
    pub const HISTORICAL_STATS: &str = "historicalStats";
}

use module_ids::*;

/// Events younger than this are flagged as new in the alert history.
const NEW_EVENT_WINDOW_MS: i64 = 300_000;

const MAX_STAFF_AREAS: usize = 6;
const MAX_LIVE_MONITORS: usize = 4;

const BEHAVIOR_ICONS: [&str; 5] = [
    "production-icon",
    "storage-icon",
    "operation-icon",
    "maintenance-icon",
    "environment-icon",
];

/// Functions that descriptors reference by name.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    computations: HashMap<String, Computation>,
    transforms: HashMap<String, CustomTransform>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every function the built-in modules use.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_transform(CustomTransform::new(FACTORY_OVERVIEW, factory_overview));
        registry.register_transform(CustomTransform::new(ALERT_DATA, alert_data));
        registry.register_transform(CustomTransform::new(STAFF_DISTRIBUTION, staff_distribution));
        registry.register_transform(CustomTransform::new(MONITORING_POINTS, monitoring_points));
        registry.register_transform(CustomTransform::new(ALERT_HISTORY, alert_history));
        registry.register_transform(CustomTransform::new(BEHAVIOR_STATS, behavior_stats));
        registry.register_transform(CustomTransform::new(LIVE_MONITORS, live_monitors));
        registry.register_transform(CustomTransform::new(PROJECT_QUEUE, project_queue_columns));
        registry.register_transform(CustomTransform::new(HISTORICAL_STATS, historical_stats));
        registry.register_computation(Computation::new(PROJECT_QUEUE, || async {
            Ok(project_queue_rows())
        }));
        registry
    }

    pub fn register_computation(&mut self, computation: Computation) {
        self.computations
            .insert(computation.name.clone(), computation);
    }

    pub fn register_transform(&mut self, transform: CustomTransform) {
        self.transforms.insert(transform.name.clone(), transform);
    }

    /// Attaches functions to every name-only reference in `descriptor`.
    ///
    /// # Errors
    /// `BindingError::Config` when a referenced name is not registered.
    pub fn resolve(&self, descriptor: &mut ModuleDescriptor) -> Result<(), BindingError> {
        for source in &mut descriptor.data_sources {
            let SourceKind::Computed(computed) = &mut source.kind else {
                continue;
            };
            let name = match &computed.computation {
                Some(computation) if !computation.is_resolved() => computation.name.clone(),
                _ => continue,
            };
            let resolved = self.computations.get(&name).cloned().ok_or_else(|| {
                BindingError::Config(format!(
                    "source '{}' references unknown computation '{}'",
                    source.name, name
                ))
            })?;
            computed.computation = Some(resolved);
        }

        if let Some(transform) = &mut descriptor.transform {
            let name = match &transform.custom {
                Some(custom) if !custom.is_resolved() => Some(custom.name.clone()),
                _ => None,
            };
            if let Some(name) = name {
                let resolved = self.transforms.get(&name).cloned().ok_or_else(|| {
                    BindingError::Config(format!(
                        "module '{}' references unknown transform '{}'",
                        descriptor.name, name
                    ))
                })?;
                transform.custom = Some(resolved);
            }
        }
        Ok(())
    }
}

/// The nine modules of the stock dashboard, functions referenced by name.
pub fn builtin_modules() -> Vec<(String, ModuleDescriptor)> {
    vec![
        (
            FACTORY_OVERVIEW.to_string(),
            remote_module(
                "园区概况",
                "显示任务数量、监控设备、检测事件等统计信息",
                DataSourceConfig::remote("dashboard_data", "/dashboard/overview-data"),
                FACTORY_OVERVIEW,
                json!({
                    "factoryCount": 5,
                    "areaCount": 230,
                    "staffCount": 3458,
                    "cameraCount": 14,
                    "deviceCount": 12,
                    "eventCount": 3732
                }),
            ),
        ),
        (
            ALERT_DATA.to_string(),
            remote_module(
                "检测告警数据",
                "异常事件类别统计",
                DataSourceConfig::remote("detectionEvents", "/dashboard/detection-event-data"),
                ALERT_DATA,
                json!([
                    {"engine_name": "未戴安全帽", "detection_count": 1},
                    {"engine_name": "玩手机", "detection_count": 11},
                    {"engine_name": "区域入侵", "detection_count": 38},
                    {"engine_name": "烟雾监测", "detection_count": 1},
                    {"engine_name": "异常事件", "detection_count": 64}
                ]),
            ),
        ),
        (
            STAFF_DISTRIBUTION.to_string(),
            remote_module(
                "游客分布",
                "人群分析中各任务的游客数量",
                DataSourceConfig::remote("crowdAnalysisData", "/dashboard/crowd-analysis-data"),
                STAFF_DISTRIBUTION,
                json!([
                    {"area": "A车间", "count": 749, "percentage": 85},
                    {"area": "B车间", "count": 631, "percentage": 70},
                    {"area": "C车间", "count": 525, "percentage": 60},
                    {"area": "D车间", "count": 444, "percentage": 50},
                    {"area": "E车间", "count": 375, "percentage": 42},
                    {"area": "F车间", "count": 350, "percentage": 40}
                ]),
            ),
        ),
        (
            MONITORING_POINTS.to_string(),
            remote_module(
                "园区人数热力图",
                "监测设备在地图上的分布和状态",
                camera_source(),
                MONITORING_POINTS,
                json!([
                    {"x": 25, "y": 30, "status": "active"},
                    {"x": 45, "y": 45, "status": "active"},
                    {"x": 65, "y": 35, "status": "warning"},
                    {"x": 75, "y": 55, "status": "active"},
                    {"x": 85, "y": 40, "status": "active"},
                    {"x": 35, "y": 65, "status": "danger"},
                    {"x": 55, "y": 70, "status": "active"}
                ]),
            ),
        ),
        (
            ALERT_HISTORY.to_string(),
            remote_module(
                "事件告警信息",
                "数据事件列表中的异常事件",
                DataSourceConfig::remote("recentEvents", "/dashboard/alert-history-data"),
                ALERT_HISTORY,
                json!([
                    {"id": 1, "type": "未戴安全帽", "device": "摄像头001", "time": "13:25:32", "status": "danger", "statusText": "未处理", "isNew": true, "detection_count": 1, "confidence": 0.9},
                    {"id": 2, "type": "玩手机", "device": "摄像头003", "time": "13:20:15", "status": "warning", "statusText": "处理中", "isNew": false, "detection_count": 2, "confidence": 0.8},
                    {"id": 3, "type": "区域入侵", "device": "摄像头005", "time": "13:15:48", "status": "success", "statusText": "已处理", "isNew": false, "detection_count": 3, "confidence": 0.7}
                ]),
            ),
        ),
        (
            BEHAVIOR_STATS.to_string(),
            remote_module(
                "检测各类型分析",
                "检测类型/算法引擎的分类统计",
                DataSourceConfig::remote("detectionTypes", "/dashboard/detection-type-data"),
                BEHAVIOR_STATS,
                json!([
                    {"type": "production", "name": "生产设备", "value": 2014, "trend": 5.2, "icon": "production-icon"},
                    {"type": "storage", "name": "存储区域", "value": 3804, "trend": -2.1, "icon": "storage-icon"},
                    {"type": "operation", "name": "作业监测", "value": 2024, "trend": 8.3, "icon": "operation-icon"},
                    {"type": "maintenance", "name": "车辆监测", "value": 2048, "trend": 3.7, "icon": "maintenance-icon"},
                    {"type": "environment", "name": "环境监测", "value": 2011, "trend": -1.5, "icon": "environment-icon"},
                    {"type": "safety", "name": "安全环保", "value": 2324, "trend": 12.8, "icon": "safety-icon"}
                ]),
            ),
        ),
        (
            LIVE_MONITORS.to_string(),
            remote_module(
                "最新报警推送",
                "数据事件列表中的最新报警推送",
                DataSourceConfig::remote("unhandledEvents", "/dashboard/alert-history-data"),
                LIVE_MONITORS,
                json!([
                    {"id": 1, "name": "入口大门", "status": "active", "statusText": "正常"},
                    {"id": 2, "name": "A车间", "status": "warning", "statusText": "告警"},
                    {"id": 3, "name": "B车间", "status": "active", "statusText": "正常"},
                    {"id": 4, "name": "仓储区", "status": "active", "statusText": "正常"}
                ]),
            ),
        ),
        (
            PROJECT_QUEUE.to_string(),
            ModuleDescriptor {
                name: "项目排队时长".to_string(),
                description: "各区域的项目排队时长统计".to_string(),
                data_sources: vec![
                    DataSourceConfig::computed("queueData", Computation::named(PROJECT_QUEUE))
                        .with_fallback(json!([])),
                ],
                transform: Some(custom_transform(PROJECT_QUEUE)),
                merge_strategy: None,
                fallback: project_queue_rows(),
            },
        ),
        (
            HISTORICAL_STATS.to_string(),
            remote_module(
                "历史数据事件",
                "数据事件列表中的历史事件统计",
                DataSourceConfig::remote("historicalEvents", "/dashboard/historical-stats-data"),
                HISTORICAL_STATS,
                json!([
                    {"date": "2022-02-24", "value": 85},
                    {"date": "2022-02-25", "value": 90},
                    {"date": "2022-02-26", "value": 95}
                ]),
            ),
        ),
    ]
}

fn remote_module(
    name: &str,
    description: &str,
    source: DataSourceConfig,
    transform: &str,
    fallback: Value,
) -> ModuleDescriptor {
    let mut source = source.with_fallback(json!([]));
    if let SourceKind::Remote(remote) = &mut source.kind {
        remote.data_path = "data.data".to_string();
    }
    ModuleDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        data_sources: vec![source],
        transform: Some(custom_transform(transform)),
        merge_strategy: None,
        fallback,
    }
}

fn camera_source() -> DataSourceConfig {
    let mut source = DataSourceConfig::remote("cameras", "/devices/");
    if let SourceKind::Remote(remote) = &mut source.kind {
        remote
            .params
            .insert("device_type".to_string(), json!("camera"));
    }
    source
}

fn custom_transform(name: &str) -> TransformSpec {
    TransformSpec {
        custom: Some(CustomTransform::named(name)),
        ..Default::default()
    }
}

fn project_queue_rows() -> Value {
    json!([
        {"area": "A区", "time": 100},
        {"area": "B区", "time": 80},
        {"area": "C区", "time": 70},
        {"area": "D区", "time": 60},
        {"area": "E区", "time": 50}
    ])
}

/// Rows of the first source result; anything else reads as no rows.
fn first_rows(results: &Value) -> Vec<Value> {
    results
        .get(0)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn field(item: &Value, key: &str) -> Value {
    item.get(key).cloned().unwrap_or(Value::Null)
}

/// Non-empty string at `key`, or `default`.
fn text_or(item: &Value, key: &str, default: &str) -> Value {
    match item.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Value::String(s.clone()),
        _ => Value::String(default.to_string()),
    }
}

/// Integer reading that tolerates numeric strings such as `"12"` or `"12 items"`.
fn int_field(item: &Value, key: &str) -> i64 {
    match item.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                .map_or(s.len(), |(i, _)| i);
            s[..end].parse().unwrap_or(0)
        }
        _ => 0,
    }
}

fn is_new_event(status: &Value) -> bool {
    status.as_str() == Some("new")
}

fn factory_overview(results: Value) -> Result<Value, BindingError> {
    let overview = results.get(0).cloned().unwrap_or(Value::Null);
    Ok(json!({
        "factoryCount": int_field(&overview, "detection_config_count"),
        "areaCount": int_field(&overview, "device_count"),
        "staffCount": int_field(&overview, "detection_event_count"),
        "cameraCount": int_field(&overview, "crowd_analysis_job_count"),
        "deviceCount": int_field(&overview, "edge_server_count"),
        "eventCount": int_field(&overview, "external_event_count"),
    }))
}

fn alert_data(results: Value) -> Result<Value, BindingError> {
    Ok(first_rows(&results)
        .iter()
        .map(|event| {
            json!({
                "engine_name": field(event, "engine_name"),
                "detection_count": field(event, "detection_count"),
            })
        })
        .collect())
}

fn staff_distribution(results: Value) -> Result<Value, BindingError> {
    let jobs = first_rows(&results);
    let max_count = jobs
        .iter()
        .map(|job| int_field(job, "people_count"))
        .fold(1, i64::max);

    Ok(jobs
        .iter()
        .take(MAX_STAFF_AREAS)
        .map(|job| {
            let count = int_field(job, "people_count");
            json!({
                "area": text_or(job, "job_name", "未知区域"),
                "count": count,
                "percentage": (count as f64 / max_count as f64 * 100.0).round() as i64,
                "lastUpdate": field(job, "last_update"),
            })
        })
        .collect())
}

fn monitoring_points(results: Value) -> Result<Value, BindingError> {
    Ok(first_rows(&results)
        .iter()
        .enumerate()
        .map(|(index, device)| {
            let active = match device.get("status") {
                Some(Value::Bool(b)) => *b,
                Some(Value::Null) | None => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Number(n)) => n.as_f64() != Some(0.0),
                Some(_) => true,
            };
            json!({
                "x": 20 + (index % 4) * 20,
                "y": 30 + (index / 4) * 15,
                "status": if active { "active" } else { "danger" },
                "deviceId": field(device, "device_id"),
                "deviceName": field(device, "device_name"),
            })
        })
        .collect())
}

fn alert_history(results: Value) -> Result<Value, BindingError> {
    let now = Local::now();
    Ok(first_rows(&results)
        .iter()
        .map(|event| {
            let timestamp = event.get("timestamp").and_then(parse_date);
            let is_new = timestamp
                .is_some_and(|ts| (now - ts).num_milliseconds() < NEW_EVENT_WINDOW_MS);
            let targets = get_nested_value(event, "normalized_data.targets")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            let confidence = event
                .get("confidence")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            let unhandled = is_new_event(&field(event, "status"));
            json!({
                "id": field(event, "event_id"),
                "device": text_or(event, "device_name", "未知设备"),
                "type": text_or(event, "engine_name", "未知算法"),
                "name": text_or(event, "location", "未知名称"),
                "detection_count": targets,
                "confidence": format!("{:.2}", confidence),
                "time": timestamp.map(|ts| ts.format("%H:%M:%S").to_string()),
                "status": if unhandled { "danger" } else { "success" },
                "statusText": if unhandled { "未处理" } else { "已处理" },
                "isNew": is_new,
            })
        })
        .collect())
}

fn behavior_stats(results: Value) -> Result<Value, BindingError> {
    Ok(first_rows(&results)
        .iter()
        .enumerate()
        .map(|(index, event)| {
            json!({
                "type": index + 1,
                "name": field(event, "engine_name"),
                "value": field(event, "count"),
                "trend": field(event, "count_yesterday_rate"),
                "icon": BEHAVIOR_ICONS.get(index).copied().unwrap_or("safety-icon"),
            })
        })
        .collect())
}

fn live_monitors(results: Value) -> Result<Value, BindingError> {
    Ok(first_rows(&results)
        .iter()
        .take(MAX_LIVE_MONITORS)
        .enumerate()
        .map(|(index, event)| {
            let alarm = is_new_event(&field(event, "status"));
            json!({
                "id": field(event, "event_id"),
                "name": text_or(event, "location", &format!("监控点{}", index + 1)),
                "image": get_nested_value(event, "normalized_data.processed_images.pic_data.original_path")
                    .cloned()
                    .unwrap_or(Value::Null),
                "status": if alarm { "danger" } else { "success" },
                "statusText": if alarm { "告警" } else { "正常" },
            })
        })
        .collect())
}

/// Splits queue rows into the `areas`/`times` columns the chart plots.
fn project_queue_columns(results: Value) -> Result<Value, BindingError> {
    let rows = first_rows(&results);
    let mut columns = Map::new();
    columns.insert(
        "areas".to_string(),
        rows.iter().map(|row| field(row, "area")).collect(),
    );
    columns.insert(
        "times".to_string(),
        rows.iter().map(|row| field(row, "time")).collect(),
    );
    Ok(Value::Object(columns))
}

fn historical_stats(results: Value) -> Result<Value, BindingError> {
    Ok(first_rows(&results)
        .iter()
        .map(|item| {
            json!({
                "date": field(item, "date"),
                "value": int_field(item, "count"),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDashboardApi;
    use crate::binding::DataBindingManager;
    use std::sync::Arc;

    fn resolved(id: &str) -> ModuleDescriptor {
        let (_, mut descriptor) = builtin_modules()
            .into_iter()
            .find(|(module_id, _)| module_id == id)
            .unwrap();
        FunctionRegistry::builtin().resolve(&mut descriptor).unwrap();
        descriptor
    }

    #[test]
    fn test_every_builtin_module_resolves() {
        let registry = FunctionRegistry::builtin();
        let modules = builtin_modules();
        assert_eq!(modules.len(), 9);
        for (id, mut descriptor) in modules {
            registry.resolve(&mut descriptor).unwrap();
            let custom = descriptor.transform.unwrap().custom.unwrap();
            assert!(custom.is_resolved(), "{} not resolved", id);
        }
    }

    #[test]
    fn test_unknown_reference_is_config_error() {
        let mut descriptor = resolved(ALERT_DATA);
        descriptor.transform = Some(custom_transform("missing"));
        let err = FunctionRegistry::new().resolve(&mut descriptor).unwrap_err();
        assert!(matches!(err, BindingError::Config(ref m) if m.contains("missing")));
    }

    #[tokio::test]
    async fn test_alert_data_module_end_to_end() {
        let mut mock = MockDashboardApi::new();
        mock.expect_get()
            .withf(|_, endpoint, _| endpoint.to_string() == "/dashboard/detection-event-data")
            .returning(|_, _, _| {
                Ok(json!({"data": {"data": [{"engine_name": "烟雾监测", "detection_count": 1}]}, "status": 200}))
            });
        let manager = DataBindingManager::new(Arc::new(mock));
        manager.register_module(ALERT_DATA, resolved(ALERT_DATA));

        assert_eq!(
            manager.load_module(ALERT_DATA).await.unwrap(),
            json!([{"engine_name": "烟雾监测", "detection_count": 1}])
        );
    }

    #[tokio::test]
    /// A dead backend leaves the module showing its transformed source fallback.
    async fn test_offline_backend_yields_empty_rows() {
        let mut mock = MockDashboardApi::new();
        mock.expect_get().returning(|_, _, _| {
            Err(crate::api::error::ApiError::Http {
                status: 503,
                message: "unavailable".to_string(),
            })
        });
        let manager = DataBindingManager::new(Arc::new(mock));
        manager.register_module(HISTORICAL_STATS, resolved(HISTORICAL_STATS));

        assert_eq!(manager.load_module(HISTORICAL_STATS).await.unwrap(), json!([]));
        assert!(manager.modules_status()[HISTORICAL_STATS].error.is_none());
    }

    #[tokio::test]
    async fn test_project_queue_computes_columns() {
        let manager = DataBindingManager::new(Arc::new(MockDashboardApi::new()));
        manager.register_module(PROJECT_QUEUE, resolved(PROJECT_QUEUE));
        let data = manager.load_module(PROJECT_QUEUE).await.unwrap();
        assert_eq!(data["areas"], json!(["A区", "B区", "C区", "D区", "E区"]));
        assert_eq!(data["times"], json!([100, 80, 70, 60, 50]));
    }

    #[test]
    fn test_factory_overview_parses_counts() {
        let results = json!([{
            "detection_config_count": "5",
            "device_count": 230,
            "detection_event_count": "3458 events",
            "edge_server_count": null
        }]);
        let overview = factory_overview(results).unwrap();
        assert_eq!(overview["factoryCount"], json!(5));
        assert_eq!(overview["areaCount"], json!(230));
        assert_eq!(overview["staffCount"], json!(3458));
        assert_eq!(overview["cameraCount"], json!(0));
        assert_eq!(overview["deviceCount"], json!(0));
    }

    #[test]
    fn test_staff_distribution_percentages() {
        let jobs: Vec<Value> = (1..=8)
            .map(|i| json!({"job_name": format!("车间{}", i), "people_count": i * 100}))
            .chain(std::iter::once(json!({"people_count": 0})))
            .collect();
        let rows = staff_distribution(json!([jobs])).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), MAX_STAFF_AREAS);
        assert_eq!(rows[0]["percentage"], json!(13));
        assert_eq!(rows[3]["area"], json!("车间4"));
        assert_eq!(rows[3]["percentage"], json!(50));
        assert_eq!(rows[0]["lastUpdate"], Value::Null);
    }

    #[test]
    fn test_alert_history_rows() {
        let recent = Local::now().to_rfc3339();
        let rows = alert_history(json!([[
            {
                "event_id": 9,
                "engine_name": "区域入侵",
                "status": "new",
                "confidence": 0.876,
                "timestamp": recent,
                "normalized_data": {"targets": [{}, {}]}
            },
            {"event_id": 10, "status": "handled", "timestamp": "2022-02-24T08:00:00"}
        ]]))
        .unwrap();

        assert_eq!(rows[0]["type"], json!("区域入侵"));
        assert_eq!(rows[0]["device"], json!("未知设备"));
        assert_eq!(rows[0]["confidence"], json!("0.88"));
        assert_eq!(rows[0]["detection_count"], json!(2));
        assert_eq!(rows[0]["status"], json!("danger"));
        assert_eq!(rows[0]["isNew"], json!(true));
        assert_eq!(rows[1]["time"], json!("08:00:00"));
        assert_eq!(rows[1]["statusText"], json!("已处理"));
        assert_eq!(rows[1]["isNew"], json!(false));
    }

    #[test]
    fn test_monitoring_points_layout() {
        let devices: Vec<Value> = (0..5)
            .map(|i| json!({"device_id": i, "status": i % 2 == 0}))
            .collect();
        let points = monitoring_points(json!([devices])).unwrap();
        assert_eq!(points[0], json!({"x": 20, "y": 30, "status": "active", "deviceId": 0, "deviceName": null}));
        assert_eq!(points[1]["status"], json!("danger"));
        assert_eq!(points[4]["x"], json!(20));
        assert_eq!(points[4]["y"], json!(45));
    }

    #[test]
    fn test_live_monitors_take_four() {
        let events: Vec<Value> = (0..6).map(|i| json!({"event_id": i, "status": "new"})).collect();
        let monitors = live_monitors(json!([events])).unwrap();
        let monitors = monitors.as_array().unwrap();
        assert_eq!(monitors.len(), MAX_LIVE_MONITORS);
        assert_eq!(monitors[2]["name"], json!("监控点3"));
        assert_eq!(monitors[0]["statusText"], json!("告警"));
        assert_eq!(monitors[0]["image"], Value::Null);
    }

    #[test]
    fn test_behavior_stats_icons() {
        let events: Vec<Value> = (0..7).map(|i| json!({"engine_name": i, "count": i})).collect();
        let stats = behavior_stats(json!([events])).unwrap();
        assert_eq!(stats[0]["type"], json!(1));
        assert_eq!(stats[1]["icon"], json!("storage-icon"));
        assert_eq!(stats[6]["icon"], json!("safety-icon"));
    }
}
