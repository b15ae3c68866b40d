use core_types::{ResultSet, TrialRecord};

/// Returns a copy of `set` with its nominal test-period length stamped onto every
/// trial and window that does not already carry one.
///
/// Merging erases the boundaries between sets, so the length has to travel with the
/// records for `test_period_months` grouping to stay meaningful afterwards.
pub fn annotate_test_period(set: &ResultSet) -> ResultSet {
    let mut annotated = set.clone();
    let Some(months) = set.test_period_months() else {
        return annotated;
    };

    match &mut annotated {
        ResultSet::Normal(normal) => stamp(&mut normal.results, months),
        ResultSet::TrainTest(split) => {
            stamp(&mut split.train_results, months);
            stamp(&mut split.test_results, months);
            stamp_optional(&mut split.all_train_results, months);
            stamp_optional(&mut split.all_test_results, months);
        }
        ResultSet::WalkForward(walk) => {
            for window in &mut walk.windows {
                window.test_period_months = window.test_period_months.or(Some(months));
                stamp(&mut window.train_results, months);
                stamp(&mut window.test_results, months);
                stamp_optional(&mut window.all_train_results, months);
                stamp_optional(&mut window.all_test_results, months);
            }
        }
    }
    annotated
}

fn stamp(trials: &mut [TrialRecord], months: u32) {
    for trial in trials {
        trial.test_period_months = trial.test_period_months.or(Some(months));
    }
}

fn stamp_optional(trials: &mut Option<Vec<TrialRecord>>, months: u32) {
    if let Some(trials) = trials {
        stamp(trials, months);
    }
}
