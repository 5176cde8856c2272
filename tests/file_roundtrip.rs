use chrono::{DateTime, TimeZone, Utc};
use taskboard::{Epic, Subtask, Task, TaskError, TaskManager, TaskStatus};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
}

#[test]
fn saved_board_reloads_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.csv");

    let mut manager = TaskManager::file_backed(&path);

    let mut task = Task::new("Solo", "standalone work")
        .with_status(TaskStatus::InProgress)
        .with_schedule(at(8, 0), 30);
    manager.create_task(&mut task).unwrap();

    let mut epic = Epic::new("Release", "ship the thing");
    let epic_id = manager.create_epic(&mut epic).unwrap();
    let mut docs = Subtask::new("Docs", "changelog", epic_id).with_schedule(at(10, 0), 45);
    let mut qa = Subtask::new("QA", "", epic_id).with_status(TaskStatus::Done);
    manager.create_subtask(&mut docs).unwrap();
    manager.create_subtask(&mut qa).unwrap();

    let expected_tasks = manager.tasks();
    let expected_epics = manager.epics();
    let expected_subtasks = manager.subtasks();
    let max_id = expected_subtasks.iter().map(Subtask::id).max().unwrap();
    drop(manager);

    let mut reloaded = TaskManager::load(&path).unwrap();
    assert_eq!(reloaded.tasks(), expected_tasks);
    assert_eq!(reloaded.epics(), expected_epics);
    assert_eq!(reloaded.subtasks(), expected_subtasks);

    // The counter resumes past everything that was loaded.
    let mut next = Task::new("after reload", "");
    assert!(reloaded.create_task(&mut next).unwrap() > max_id);

    // Overlap detection works against the reloaded schedule.
    let mut clash = Task::new("clash", "").with_schedule(at(10, 15), 30);
    assert!(matches!(
        reloaded.create_task(&mut clash),
        Err(TaskError::ScheduleConflict)
    ));
}

#[test]
fn epic_linkage_and_derived_state_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.csv");

    let mut manager = TaskManager::file_backed(&path);
    let mut epic = Epic::new("E", "");
    let epic_id = manager.create_epic(&mut epic).unwrap();
    let mut s1 = Subtask::new("S1", "", epic_id).with_schedule(at(10, 0), 30);
    let mut s2 = Subtask::new("S2", "", epic_id)
        .with_status(TaskStatus::InProgress)
        .with_schedule(at(11, 0), 90);
    let id1 = manager.create_subtask(&mut s1).unwrap();
    let id2 = manager.create_subtask(&mut s2).unwrap();
    drop(manager);

    let mut reloaded = TaskManager::load(&path).unwrap();
    let stored = reloaded.get_epic(epic_id).unwrap();
    assert_eq!(stored.subtask_ids, vec![id1, id2]);
    assert_eq!(stored.base.status, TaskStatus::InProgress);
    assert_eq!(stored.base.start_time, Some(at(10, 0)));
    assert_eq!(stored.end_time, Some(at(12, 30)));
    assert_eq!(stored.base.duration_minutes, Some(120));
}

#[test]
fn loading_a_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = TaskManager::load(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, TaskError::Storage(_)));
}
