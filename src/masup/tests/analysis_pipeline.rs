mod common;

use self::common::{at, process, ScriptedProvider};
use masup::exporters::AnalysisSnapshot;
use masup::extracts::process::extract_process_data::ProcessObservation;
use masup::extracts::process::process_manager::recorder::{ActivityLogEntry, ToolEvent};
use masup::process_identification::target_pipeline::{StepStatus, WorkflowGraph};
use masup::process_identification::target_process::ToolCatalog;
use masup::Analysis;
use rstest::*;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

#[fixture]
fn catalog() -> ToolCatalog {
    ToolCatalog::embedded().unwrap()
}

#[fixture]
fn workflow() -> WorkflowGraph {
    WorkflowGraph::embedded().unwrap()
}

/// A short analysis session: static triage, disassembly, then debugging.
fn session() -> Vec<Vec<ProcessObservation>> {
    vec![
        vec![process(100, "pestudio.exe", "C:\\Tools\\pestudio\\pestudio.exe")],
        vec![
            process(100, "pestudio.exe", "C:\\Tools\\pestudio\\pestudio.exe"),
            process(200, "ida64.exe", "").with_arguments(["sample.exe"]),
        ],
        vec![process(200, "ida64.exe", "C:\\Program Files\\IDA\\ida64.exe")],
        vec![
            process(200, "ida64.exe", "C:\\Program Files\\IDA\\ida64.exe"),
            process(300, "x64dbg.exe", "C:\\Tools\\x64dbg\\x64dbg.exe"),
        ],
        vec![process(300, "x64dbg.exe", "C:\\Tools\\x64dbg\\x64dbg.exe")],
        vec![],
    ]
}

fn run_session(catalog: ToolCatalog, workflow: WorkflowGraph) -> Analysis {
    let mut analysis = Analysis::new(catalog, workflow, Box::new(ScriptedProvider::new(session())));
    for tick in 0..6 {
        analysis.tick(at(tick * 10)).unwrap();
    }
    analysis
}

fn events(log: &[ActivityLogEntry]) -> Vec<(String, ToolEvent)> {
    log.iter()
        .map(|entry| (entry.tool_id.clone(), entry.event))
        .collect()
}

#[rstest]
fn test_session_log(catalog: ToolCatalog, workflow: WorkflowGraph) {
    let analysis = run_session(catalog, workflow);
    let log = analysis.get_activity_log();

    let expected: Vec<(String, ToolEvent)> = vec![
        ("pestudio", ToolEvent::Open),
        ("ida", ToolEvent::Open),
        ("pestudio", ToolEvent::Close),
        ("x64dbg", ToolEvent::Open),
        ("ida", ToolEvent::Close),
        ("x64dbg", ToolEvent::Close),
    ]
    .into_iter()
    .map(|(id, event)| (id.to_string(), event))
    .collect();
    assert_eq!(events(&log), expected);

    // ida opened without a path; the path seen later is backfilled for its close
    let ida_open = &log[1];
    assert_eq!(ida_open.executable_path, "");
    assert_eq!(ida_open.arguments, "sample.exe");
    let ida_close = &log[4];
    assert_eq!(ida_close.executable_path, "C:\\Program Files\\IDA\\ida64.exe");
    assert_eq!(ida_close.timestamp, at(40));
}

#[rstest]
fn test_open_and_close_alternate(catalog: ToolCatalog, workflow: WorkflowGraph) {
    let analysis = run_session(catalog, workflow);

    let mut open: BTreeSet<String> = BTreeSet::new();
    for entry in analysis.get_activity_log() {
        match entry.event {
            ToolEvent::Open => assert!(open.insert(entry.tool_id), "opened twice"),
            ToolEvent::Close => assert!(open.remove(&entry.tool_id), "closed while not open"),
        }
    }
    assert!(open.is_empty());
}

#[rstest]
fn test_closes_precede_opens_within_a_tick(catalog: ToolCatalog, workflow: WorkflowGraph) {
    let analysis = run_session(catalog, workflow);
    let log = analysis.get_activity_log();

    let mut by_tick: BTreeMap<_, Vec<ToolEvent>> = BTreeMap::new();
    for entry in &log {
        by_tick.entry(entry.timestamp).or_default().push(entry.event);
    }
    for events in by_tick.values() {
        let first_open = events.iter().position(|e| *e == ToolEvent::Open);
        let last_close = events.iter().rposition(|e| *e == ToolEvent::Close);
        if let (Some(open), Some(close)) = (first_open, last_close) {
            assert!(close < open);
        }
    }
}

#[rstest]
fn test_executables_never_shrink(catalog: ToolCatalog, workflow: WorkflowGraph) {
    let mut analysis = Analysis::new(catalog, workflow, Box::new(ScriptedProvider::new(session())));
    let mut previous = BTreeMap::new();
    for tick in 0..6 {
        analysis.tick(at(tick)).unwrap();
        let current = analysis.get_executables();
        for (tool_id, paths) in &previous {
            let paths: &BTreeSet<String> = paths;
            assert!(paths.is_subset(&current[tool_id]));
        }
        previous = current;
    }
    assert_eq!(
        previous["ida"],
        BTreeSet::from(["C:\\Program Files\\IDA\\ida64.exe".to_string()])
    );
}

#[rstest]
fn test_workflow_progress(catalog: ToolCatalog, workflow: WorkflowGraph) {
    let analysis = run_session(catalog, workflow);
    let activities = analysis.get_workflow_activities();

    assert_eq!(
        activities.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["advanced_static", "basic_static", "debugging"]
    );
    let basic = &activities["basic_static"];
    assert!(!basic.active);
    assert_eq!(basic.start_time, at(0));
    assert_eq!(basic.stop_time, Some(Duration::from_secs(20)));
    assert_eq!(activities["debugging"].stop_time, Some(Duration::from_secs(20)));

    let progress = analysis.progress();
    assert_eq!(
        progress
            .iter()
            .map(|row| (row.node_id.as_str(), row.status))
            .collect::<Vec<_>>(),
        vec![
            ("basic_static", StepStatus::Ended),
            ("advanced_static", StepStatus::Ended),
            ("debugging", StepStatus::Ended),
        ]
    );

    let suggested: Vec<_> = analysis
        .suggestions()
        .into_iter()
        .map(|s| s.node_id)
        .collect();
    assert_eq!(suggested, vec!["behavioural", "memory"]);
}

#[rstest]
fn test_export_restore_round_trip(catalog: ToolCatalog, workflow: WorkflowGraph) {
    let analysis = run_session(catalog.clone(), workflow.clone());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.json");

    analysis.export_to_file(&path).unwrap();
    let snapshot = AnalysisSnapshot::read_from_file(&path).unwrap();
    let restored = Analysis::restore(
        catalog,
        workflow,
        Box::new(ScriptedProvider::new(vec![])),
        snapshot,
    );

    pretty_assertions_sorted::assert_eq!(restored.get_activity_log(), analysis.get_activity_log());
    pretty_assertions_sorted::assert_eq!(restored.get_executables(), analysis.get_executables());
    pretty_assertions_sorted::assert_eq!(
        restored.get_workflow_activities(),
        analysis.get_workflow_activities()
    );
    assert_eq!(restored.running_tools(), analysis.running_tools());
}

#[rstest]
fn test_readers_never_see_partial_batches(catalog: ToolCatalog, workflow: WorkflowGraph) {
    // every tick swaps ida for x64dbg or back: one Close and one Open per batch
    let snapshots = (0..200)
        .map(|i| {
            if i % 2 == 0 {
                vec![process(1, "ida64", &format!("/opt/ida/{}/ida64", i))]
            } else {
                vec![process(2, "x64dbg", &format!("/opt/x64dbg/{}/x64dbg", i))]
            }
        })
        .collect();
    let mut analysis = Analysis::new(catalog, workflow, Box::new(ScriptedProvider::new(snapshots)));
    let log = analysis.activity_log();
    let executables = analysis.executables();

    let reader = std::thread::spawn(move || {
        let mut last_len = 0;
        let mut last_executables = BTreeMap::new();
        for _ in 0..500 {
            let len = log.len();
            // the first batch holds a single Open, every later one a Close and an Open
            assert!(len == 0 || len % 2 == 1, "torn batch: {} entries", len);

            let current = executables.executables();
            let current_len: usize = current.values().map(BTreeSet::len).sum();
            assert!(current_len >= last_len, "registry shrank");
            for (tool_id, paths) in &last_executables {
                let paths: &BTreeSet<String> = paths;
                assert!(paths.is_subset(&current[tool_id]));
            }
            last_len = current_len;
            last_executables = current;
        }
    });

    for tick in 0..200 {
        analysis.tick(at(tick)).unwrap();
    }
    reader.join().unwrap();
    assert_eq!(analysis.get_activity_log().len(), 1 + 199 * 2);
    assert_eq!(analysis.executables().len(), 200);
}
