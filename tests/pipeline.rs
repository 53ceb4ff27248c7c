//! End-to-end pipeline scenarios against a real (temporary) filesystem.

use std::fs;
use std::sync::Arc;

use wpeg::{
    resolve, Bus, EventKind, LogReload, Pipeline, Registry, ReloadCoordinator, Runner, Target,
};

fn pipeline_for(targets: Vec<Target>, is_dev: bool) -> (Pipeline, Bus) {
    let bus = Bus::default();
    let registry = Arc::new(Registry::builtin(bus.clone()));
    let runner = Runner::new(registry, bus.clone());
    let reload = Arc::new(ReloadCoordinator::new(bus.clone(), Arc::new(LogReload)));
    (
        Pipeline::new(runner, bus.clone(), reload, targets, is_dev),
        bus,
    )
}

#[tokio::test]
async fn test_build_with_empty_copy_glob_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("a")).unwrap();

    let target = Target {
        copy_files_src: vec![format!("{}/a/*", root.display())],
        copy_files_dist: root.join("out").display().to_string(),
        ..Target::default()
    };
    let (pipeline, _bus) = pipeline_for(vec![target], false);

    pipeline.run_build().await.unwrap();
    // Nothing matched, nothing written.
    assert!(!root.join("out").exists());
}

#[tokio::test]
async fn test_clean_removes_configured_paths() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("out")).unwrap();
    fs::write(root.join("out/stale.txt"), "old").unwrap();

    let target = Target {
        clean_files: vec![root.join("out").display().to_string()],
        ..Target::default()
    };
    let (pipeline, _bus) = pipeline_for(vec![target], false);

    pipeline.run_clean().await.unwrap();
    assert!(!root.join("out").exists());
}

#[tokio::test]
async fn test_multi_target_copy_writes_disjoint_dists() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("theme")).unwrap();
    fs::create_dir(root.join("plugin")).unwrap();
    fs::write(root.join("theme/style.css"), "t").unwrap();
    fs::write(root.join("plugin/main.php"), "p").unwrap();

    let targets = vec![
        Target {
            name: Some("theme".into()),
            copy_files_src: vec![format!("{}/theme/*", root.display())],
            copy_files_dist: root.join("dist-theme").display().to_string(),
            ..Target::default()
        },
        Target {
            name: Some("plugin".into()),
            copy_files_src: vec![format!("{}/plugin/*", root.display())],
            copy_files_dist: root.join("dist-plugin").display().to_string(),
            ..Target::default()
        },
    ];
    let (pipeline, _bus) = pipeline_for(targets, false);

    pipeline.run_build().await.unwrap();
    assert_eq!(
        fs::read_to_string(root.join("dist-theme/style.css")).unwrap(),
        "t"
    );
    assert_eq!(
        fs::read_to_string(root.join("dist-plugin/main.php")).unwrap(),
        "p"
    );
}

#[tokio::test]
async fn test_template_variables_are_substituted_during_build() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("src")).unwrap();
    fs::write(root.join("src/header.php"), "Theme: @@name v@@version").unwrap();

    let target = Target {
        template_files_src: vec![format!("{}/src/*.php", root.display())],
        template_files_dist: root.join("out").display().to_string(),
        template_files_variables: [
            ("name".to_string(), "demo".to_string()),
            ("version".to_string(), "1.2.0".to_string()),
        ]
        .into_iter()
        .collect(),
        ..Target::default()
    };
    let (pipeline, _bus) = pipeline_for(vec![target], false);

    pipeline.run_build().await.unwrap();
    assert_eq!(
        fs::read_to_string(root.join("out/header.php")).unwrap(),
        "Theme: demo v1.2.0"
    );
}

#[tokio::test]
async fn test_reload_stays_disarmed_without_live_reload_config() {
    let dir = tempfile::tempdir().unwrap();
    let target = Target {
        clean_files: vec![dir.path().join("none").display().to_string()],
        ..Target::default()
    };
    let (pipeline, bus) = pipeline_for(vec![target], true);
    let mut rx = bus.subscribe();

    pipeline.reload().arm_from(pipeline.targets()).await;
    assert!(!pipeline.reload().is_armed());
    pipeline.reload().broadcast().await;

    // Neither arming nor broadcast events were published.
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_resolved_config_drives_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("assets")).unwrap();
    fs::write(root.join("assets/logo.svg"), "<svg/>").unwrap();

    let config = serde_json::json!({
        "dist": root.join("dist").display().to_string(),
        "copy_files_src": format!("{}/assets/*", root.display()),
    });
    let config_path = root.join("wpeg.config.json");
    fs::write(&config_path, config.to_string()).unwrap();

    let targets = resolve(&config_path).unwrap();
    assert_eq!(targets.len(), 1);
    // Default copy destination is "{dist}", expanded from the override.
    assert_eq!(
        targets[0].copy_files_dist,
        root.join("dist").display().to_string()
    );

    let (pipeline, bus) = pipeline_for(targets, false);
    let mut rx = bus.subscribe();
    pipeline.run_build().await.unwrap();

    assert_eq!(
        fs::read_to_string(root.join("dist/logo.svg")).unwrap(),
        "<svg/>"
    );

    // The build wrapper and the copy task both report lifecycle events.
    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push((ev.kind, ev.task));
    }
    assert!(kinds
        .iter()
        .any(|(k, t)| *k == EventKind::TaskStarting && t.as_deref() == Some("copy")));
    assert!(kinds
        .iter()
        .any(|(k, t)| *k == EventKind::TaskFinished && t.as_deref() == Some("build")));
}
