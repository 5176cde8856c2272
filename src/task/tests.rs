#[cfg(test)]
mod tests {
    use crate::error::TaskError;
    use crate::task::aggregate;
    use crate::task::history::HistoryTracker;
    use crate::task::manager::TaskManager;
    use crate::task::types::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
    }

    fn timed_task(name: &str, hour: u32, minute: u32, minutes: u32) -> Task {
        Task::new(name, "").with_schedule(at(hour, minute), minutes)
    }

    #[test]
    fn ids_increase_across_all_three_kinds() {
        let mut manager = TaskManager::in_memory();

        let mut task = Task::new("T1", "");
        let mut epic = Epic::new("E1", "");
        let task_id = manager.create_task(&mut task).unwrap();
        let epic_id = manager.create_epic(&mut epic).unwrap();
        let mut subtask = Subtask::new("S1", "", epic_id);
        let subtask_id = manager.create_subtask(&mut subtask).unwrap();

        assert_eq!(task_id, 1);
        assert_eq!(epic_id, 2);
        assert_eq!(subtask_id, 3);

        // Deletion never frees an id for reuse.
        manager.delete_subtask(subtask_id).unwrap();
        let mut another = Task::new("T2", "");
        assert_eq!(manager.create_task(&mut another).unwrap(), 4);
    }

    #[test]
    fn created_id_is_reflected_onto_the_callers_record() {
        let mut manager = TaskManager::in_memory();
        let mut task = Task::new("T1", "");
        let id = manager.create_task(&mut task).unwrap();
        assert_eq!(task.id, id);
    }

    #[test]
    fn stored_entities_are_decoupled_snapshots() {
        let mut manager = TaskManager::in_memory();
        let mut task = Task::new("original", "");
        let id = manager.create_task(&mut task).unwrap();

        // Mutating the in-hand record must not alter stored state.
        task.name = "mutated".to_string();
        assert_eq!(manager.get_task(id).unwrap().name, "original");

        manager.update_task(&task).unwrap();
        assert_eq!(manager.get_task(id).unwrap().name, "mutated");
    }

    #[test]
    fn fresh_epic_derives_new_status_and_zero_duration() {
        let mut manager = TaskManager::in_memory();
        let mut epic = Epic::new("E", "");
        let id = manager.create_epic(&mut epic).unwrap();

        let stored = manager.get_epic(id).unwrap();
        assert_eq!(stored.base.status, TaskStatus::New);
        assert_eq!(stored.base.duration_minutes, Some(0));
        assert_eq!(stored.base.start_time, None);
        assert_eq!(stored.end_time, None);
    }

    #[test]
    fn epic_status_truth_table() {
        let sub = |status| Subtask::new("s", "", 1).with_status(status);

        assert_eq!(aggregate::rollup(&[]).status, TaskStatus::New);
        assert_eq!(
            aggregate::rollup(&[sub(TaskStatus::New), sub(TaskStatus::New)]).status,
            TaskStatus::New
        );
        assert_eq!(
            aggregate::rollup(&[sub(TaskStatus::Done)]).status,
            TaskStatus::Done
        );
        assert_eq!(
            aggregate::rollup(&[sub(TaskStatus::New), sub(TaskStatus::Done)]).status,
            TaskStatus::InProgress
        );
        assert_eq!(
            aggregate::rollup(&[sub(TaskStatus::Done), sub(TaskStatus::InProgress)]).status,
            TaskStatus::InProgress
        );
    }

    #[test]
    fn epic_window_spans_its_timed_subtasks() {
        let mut manager = TaskManager::in_memory();
        let mut epic = Epic::new("E", "");
        let epic_id = manager.create_epic(&mut epic).unwrap();

        let mut s1 = Subtask::new("S1", "", epic_id).with_schedule(at(10, 0), 30);
        let mut s2 = Subtask::new("S2", "", epic_id)
            .with_status(TaskStatus::InProgress)
            .with_schedule(at(11, 0), 90);
        manager.create_subtask(&mut s1).unwrap();
        manager.create_subtask(&mut s2).unwrap();

        let stored = manager.get_epic(epic_id).unwrap();
        assert_eq!(stored.base.status, TaskStatus::InProgress);
        assert_eq!(stored.base.start_time, Some(at(10, 0)));
        assert_eq!(stored.end_time, Some(at(12, 30)));
        assert_eq!(stored.base.duration_minutes, Some(120));
    }

    #[test]
    fn epic_goes_done_when_every_subtask_does() {
        let mut manager = TaskManager::in_memory();
        let mut epic = Epic::new("E", "");
        let epic_id = manager.create_epic(&mut epic).unwrap();

        let mut s1 = Subtask::new("S1", "", epic_id).with_schedule(at(10, 0), 30);
        let mut s2 = Subtask::new("S2", "", epic_id).with_schedule(at(11, 0), 90);
        manager.create_subtask(&mut s1).unwrap();
        manager.create_subtask(&mut s2).unwrap();

        s1.base.status = TaskStatus::Done;
        s2.base.status = TaskStatus::Done;
        manager.update_subtask(&s1).unwrap();
        manager.update_subtask(&s2).unwrap();

        assert_eq!(manager.get_epic(epic_id).unwrap().base.status, TaskStatus::Done);
    }

    #[test]
    fn untimed_subtasks_leave_the_window_absent_but_duration_zero() {
        let mut manager = TaskManager::in_memory();
        let mut epic = Epic::new("E", "");
        let epic_id = manager.create_epic(&mut epic).unwrap();
        let mut s1 = Subtask::new("S1", "", epic_id);
        manager.create_subtask(&mut s1).unwrap();

        let stored = manager.get_epic(epic_id).unwrap();
        assert_eq!(stored.base.start_time, None);
        assert_eq!(stored.end_time, None);
        assert_eq!(stored.base.duration_minutes, Some(0));

        // A timed sibling contributes alone.
        let mut s2 = Subtask::new("S2", "", epic_id).with_schedule(at(9, 0), 15);
        manager.create_subtask(&mut s2).unwrap();
        let stored = manager.get_epic(epic_id).unwrap();
        assert_eq!(stored.base.start_time, Some(at(9, 0)));
        assert_eq!(stored.end_time, Some(at(9, 15)));
        assert_eq!(stored.base.duration_minutes, Some(15));
    }

    #[test]
    fn history_dedups_and_moves_to_end() {
        let mut manager = TaskManager::in_memory();
        let mut t1 = Task::new("T1", "");
        let mut t2 = Task::new("T2", "");
        let id1 = manager.create_task(&mut t1).unwrap();
        let id2 = manager.create_task(&mut t2).unwrap();

        manager.get_task(id1).unwrap();
        manager.get_task(id2).unwrap();
        manager.get_task(id1).unwrap();

        let ids: Vec<TaskId> = manager.history().iter().map(WorkItem::id).collect();
        assert_eq!(ids, vec![id2, id1]);
    }

    #[test]
    fn history_unlinks_head_middle_and_tail() {
        let entry = |id: TaskId| {
            let mut task = Task::new("t", "");
            task.id = id;
            WorkItem::Task(task)
        };
        let ids = |tracker: &HistoryTracker| -> Vec<TaskId> {
            tracker.history().iter().map(WorkItem::id).collect()
        };

        let mut tracker = HistoryTracker::new();
        for id in 1..=3 {
            tracker.add(entry(id));
        }

        tracker.remove(1);
        assert_eq!(ids(&tracker), vec![2, 3]);

        tracker.add(entry(1));
        tracker.remove(3); // now the middle element
        assert_eq!(ids(&tracker), vec![2, 1]);

        tracker.remove(1);
        assert_eq!(ids(&tracker), vec![2]);

        // Removing an id that is not tracked is a no-op.
        tracker.remove(42);
        assert_eq!(ids(&tracker), vec![2]);

        tracker.remove(2);
        assert!(tracker.is_empty());
    }

    #[test]
    fn overlapping_interval_is_rejected_adjacent_is_not() {
        let mut manager = TaskManager::in_memory();
        let mut t1 = timed_task("T1", 10, 0, 30);
        manager.create_task(&mut t1).unwrap();

        let mut t2 = timed_task("T2", 10, 15, 30);
        assert!(matches!(
            manager.create_task(&mut t2),
            Err(TaskError::ScheduleConflict)
        ));
        // A failed create leaves no trace.
        assert_eq!(manager.tasks().len(), 1);
        assert_eq!(manager.prioritized().len(), 1);

        // [10:30, 11:00) touches [10:00, 10:30) without intersecting it.
        let mut t3 = timed_task("T3", 10, 30, 30);
        manager.create_task(&mut t3).unwrap();
    }

    #[test]
    fn updating_a_task_does_not_conflict_with_itself() {
        let mut manager = TaskManager::in_memory();
        let mut task = timed_task("T1", 10, 0, 30);
        manager.create_task(&mut task).unwrap();

        task.description = "same slot, new words".to_string();
        manager.update_task(&task).unwrap();

        // Moving onto someone else's slot still fails, and the index keeps
        // the pre-update schedule.
        let mut other = timed_task("T2", 12, 0, 60);
        manager.create_task(&mut other).unwrap();
        task.start_time = Some(at(12, 30));
        assert!(matches!(
            manager.update_task(&task),
            Err(TaskError::ScheduleConflict)
        ));
        let starts: Vec<_> = manager
            .prioritized()
            .iter()
            .filter_map(WorkItem::start_time)
            .collect();
        assert_eq!(starts, vec![at(10, 0), at(12, 0)]);
    }

    #[test]
    fn unscheduled_items_never_conflict() {
        let mut manager = TaskManager::in_memory();
        let mut t1 = timed_task("T1", 10, 0, 30);
        manager.create_task(&mut t1).unwrap();

        let mut untimed = Task::new("anytime", "");
        manager.create_task(&mut untimed).unwrap();

        // A start without a duration joins the prioritized list but takes
        // part in no overlap check.
        let mut open_ended = Task::new("open", "");
        open_ended.start_time = Some(at(10, 0));
        manager.create_task(&mut open_ended).unwrap();
        assert_eq!(manager.prioritized().len(), 2);
    }

    #[test]
    fn prioritized_is_ascending_by_start() {
        let mut manager = TaskManager::in_memory();
        let mut late = timed_task("late", 15, 0, 30);
        let mut early = timed_task("early", 8, 0, 30);
        let mut middle = timed_task("middle", 11, 0, 30);
        manager.create_task(&mut late).unwrap();
        manager.create_task(&mut early).unwrap();
        manager.create_task(&mut middle).unwrap();

        let names: Vec<String> = manager
            .prioritized()
            .iter()
            .map(|item| item.base().name.clone())
            .collect();
        assert_eq!(names, vec!["early", "middle", "late"]);
    }

    #[test]
    fn update_at_an_unknown_id_inserts() {
        let mut manager = TaskManager::in_memory();
        let mut task = Task::new("phantom", "");
        task.id = 99;
        manager.update_task(&task).unwrap();
        assert_eq!(manager.get_task(99).unwrap().name, "phantom");
    }

    #[test]
    fn subtask_requires_an_existing_epic() {
        let mut manager = TaskManager::in_memory();
        let mut orphan = Subtask::new("S", "", 42);
        assert!(matches!(
            manager.create_subtask(&mut orphan),
            Err(TaskError::UnknownEpic(42))
        ));
        assert!(manager.subtasks().is_empty());
    }

    #[test]
    fn deleting_an_epic_cascades_everywhere() {
        let mut manager = TaskManager::in_memory();
        let mut epic = Epic::new("E", "");
        let epic_id = manager.create_epic(&mut epic).unwrap();
        let mut s1 = Subtask::new("S1", "", epic_id).with_schedule(at(10, 0), 30);
        let mut s2 = Subtask::new("S2", "", epic_id).with_schedule(at(11, 0), 90);
        let id1 = manager.create_subtask(&mut s1).unwrap();
        let id2 = manager.create_subtask(&mut s2).unwrap();

        manager.get_subtask(id1).unwrap();
        manager.get_subtask(id2).unwrap();
        manager.get_epic(epic_id).unwrap();

        manager.delete_epic(epic_id).unwrap();

        assert!(matches!(
            manager.get_subtask(id1),
            Err(TaskError::NotFound { .. })
        ));
        assert!(matches!(
            manager.get_subtask(id2),
            Err(TaskError::NotFound { .. })
        ));
        assert!(manager.subtasks().is_empty());
        assert!(manager.prioritized().is_empty());
        assert!(manager.history().is_empty());
    }

    #[test]
    fn deleting_a_subtask_refreshes_its_former_epic() {
        let mut manager = TaskManager::in_memory();
        let mut epic = Epic::new("E", "");
        let epic_id = manager.create_epic(&mut epic).unwrap();
        let mut done = Subtask::new("done", "", epic_id).with_status(TaskStatus::Done);
        let mut open = Subtask::new("open", "", epic_id).with_schedule(at(10, 0), 30);
        manager.create_subtask(&mut done).unwrap();
        let open_id = manager.create_subtask(&mut open).unwrap();
        assert_eq!(
            manager.get_epic(epic_id).unwrap().base.status,
            TaskStatus::InProgress
        );

        manager.delete_subtask(open_id).unwrap();

        let stored = manager.get_epic(epic_id).unwrap();
        assert_eq!(stored.base.status, TaskStatus::Done);
        assert_eq!(stored.subtask_ids.len(), 1);
        assert!(!manager.prioritized().iter().any(|i| i.id() == open_id));
    }

    #[test]
    fn clearing_subtasks_resets_surviving_epics() {
        let mut manager = TaskManager::in_memory();
        let mut epic = Epic::new("E", "");
        let epic_id = manager.create_epic(&mut epic).unwrap();
        let mut sub = Subtask::new("S", "", epic_id)
            .with_status(TaskStatus::Done)
            .with_schedule(at(10, 0), 30);
        manager.create_subtask(&mut sub).unwrap();

        manager.clear_subtasks().unwrap();

        let stored = manager.get_epic(epic_id).unwrap();
        assert!(stored.subtask_ids.is_empty());
        assert_eq!(stored.base.status, TaskStatus::New);
        assert_eq!(stored.base.duration_minutes, Some(0));
        assert_eq!(stored.base.start_time, None);
        assert!(manager.prioritized().is_empty());
    }

    #[test]
    fn moving_a_subtask_re_aggregates_both_epics() {
        let mut manager = TaskManager::in_memory();
        let mut first = Epic::new("A", "");
        let mut second = Epic::new("B", "");
        let first_id = manager.create_epic(&mut first).unwrap();
        let second_id = manager.create_epic(&mut second).unwrap();
        let mut sub = Subtask::new("S", "", first_id).with_status(TaskStatus::InProgress);
        let sub_id = manager.create_subtask(&mut sub).unwrap();

        sub.epic_id = second_id;
        manager.update_subtask(&sub).unwrap();

        let old_owner = manager.get_epic(first_id).unwrap();
        assert!(old_owner.subtask_ids.is_empty());
        assert_eq!(old_owner.base.status, TaskStatus::New);
        let new_owner = manager.get_epic(second_id).unwrap();
        assert_eq!(new_owner.subtask_ids, vec![sub_id]);
        assert_eq!(new_owner.base.status, TaskStatus::InProgress);
    }

    #[test]
    fn epic_update_keeps_links_and_derived_fields() {
        let mut manager = TaskManager::in_memory();
        let mut epic = Epic::new("E", "old words");
        let epic_id = manager.create_epic(&mut epic).unwrap();
        let mut sub = Subtask::new("S", "", epic_id).with_status(TaskStatus::InProgress);
        let sub_id = manager.create_subtask(&mut sub).unwrap();

        // The caller's record carries no links and a bogus status; neither
        // may take effect.
        let mut replacement = Epic::new("E", "new words");
        replacement.base.id = epic_id;
        replacement.base.status = TaskStatus::Done;
        manager.update_epic(&replacement).unwrap();

        let stored = manager.get_epic(epic_id).unwrap();
        assert_eq!(stored.base.description, "new words");
        assert_eq!(stored.subtask_ids, vec![sub_id]);
        assert_eq!(stored.base.status, TaskStatus::InProgress);
    }

    #[test]
    fn deleting_unknown_ids_reports_not_found() {
        let mut manager = TaskManager::in_memory();
        assert!(matches!(
            manager.delete_task(7),
            Err(TaskError::NotFound { .. })
        ));
        assert!(matches!(
            manager.delete_epic(7),
            Err(TaskError::NotFound { .. })
        ));
        assert!(matches!(
            manager.delete_subtask(7),
            Err(TaskError::NotFound { .. })
        ));
    }
}
