use compose::{
    build_failure_report, extract_actions, has_changes, is_failed, parse_events, Event,
    ResourceType, Status, WarningSink,
};

fn parse_with_warnings(text: &str, dry_run: bool) -> (Vec<Event>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut collect = |msg: String| warnings.push(msg);
    let sink: &mut dyn WarningSink = &mut collect;
    let events = parse_events(text, dry_run, Some(sink));
    (events, warnings)
}

#[test]
fn daemon_error_with_continuation_fails_regardless_of_rc() {
    let stderr = "Error response from daemon: conflict\nwidget Error\n  additional detail";
    let (events, warnings) = parse_with_warnings(stderr, false);
    assert!(warnings.is_empty());

    assert_eq!(
        events,
        vec![
            Event::new(
                ResourceType::Unknown,
                "",
                Some(Status::Error),
                Some("Error response from daemon: conflict".to_string()),
            ),
            Event::new(
                ResourceType::Unknown,
                "widget",
                Some(Status::Error),
                Some("additional detail".to_string()),
            ),
        ]
    );
    assert!(is_failed(&events, 0));
    assert!(is_failed(&events, 1));

    let report = build_failure_report(&events, 0, &["compose".to_string()], "", stderr, "docker")
        .expect("failure report");
    assert_eq!(
        report.msg,
        "General error: Error response from daemon: conflict\n\
         Error when processing widget: additional detail"
    );
    assert_eq!(report.cmd, "docker compose");
}

#[test]
fn up_output_yields_changes_and_actions() {
    let stderr = "\
 Network proj_default  Creating
 Network proj_default  Created
 Volume \"proj_data\"  Creating
 Volume \"proj_data\"  Created
 web Pulling
 web Pulled
 Container proj-web-1  Creating
 Container proj-web-1  Created
 Container proj-web-1  Starting
 Container proj-web-1  Started
";
    let (events, warnings) = parse_with_warnings(stderr, false);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(events.len(), 10);
    assert_eq!(events[2].resource_id, "\"proj_data\"");
    assert_eq!(events[4].resource_type, ResourceType::Service);
    assert!(has_changes(&events));

    let actions = extract_actions(&events);
    let summary: Vec<(ResourceType, &str, Status)> = actions
        .iter()
        .map(|a| (a.what, a.id.as_str(), a.status))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ResourceType::Network, "proj_default", Status::Creating),
            (ResourceType::Volume, "\"proj_data\"", Status::Creating),
            (ResourceType::Service, "web", Status::Pulling),
            (ResourceType::Container, "proj-web-1", Status::Creating),
            (ResourceType::Container, "proj-web-1", Status::Starting),
        ]
    );

    // Aggregators are pure.
    assert_eq!(extract_actions(&events), actions);
    assert_eq!(has_changes(&events), has_changes(&events));
}

#[test]
fn settled_project_has_no_changes() {
    let (events, _) = parse_with_warnings("Container proj-web-1 Running\n", false);
    assert!(!has_changes(&events));
    assert!(extract_actions(&events).is_empty());
    assert!(!has_changes(&[]));
}

#[test]
fn dry_run_marker_is_stripped() {
    let (events, warnings) = parse_with_warnings("DRY-RUN MODE - Network net1 Created", true);
    assert!(warnings.is_empty());
    assert_eq!(
        events,
        vec![Event::new(ResourceType::Network, "net1", Some(Status::Created), None)]
    );
}

#[test]
fn dry_run_line_without_marker_warns_once_and_still_parses() {
    let (events, warnings) = parse_with_warnings("Network net1 Created", true);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("missing dry-run mode marker"));
    assert_eq!(
        events,
        vec![Event::new(ResourceType::Network, "net1", Some(Status::Created), None)]
    );
}

#[test]
fn unparsable_lines_are_reported_not_fatal() {
    let (events, warnings) = parse_with_warnings("[+] Running 2/2\nContainer c1 Stopped", false);
    assert_eq!(events.len(), 1);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Cannot parse event from line: \"[+] Running 2/2\""));
}

#[test]
fn return_code_without_error_events() {
    assert!(is_failed(&[], 1));
    let report = build_failure_report(&[], 1, &[], "", "", "docker").expect("failure report");
    assert_eq!(report.msg, "Return code 1 is non-zero");
}
