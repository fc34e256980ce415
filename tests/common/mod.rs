use std::path::PathBuf;

use anyhow::Context as _;
use eucalyptus::{Event, Runner, World};

/// Returns the path of the given file under `tests/features`.
pub fn feature(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/features")
        .join(name)
}

/// Results collected by the `after example` hook during the last run.
pub fn results(world: &World) -> Vec<i64> {
    world.get::<Vec<i64>>("all_results").cloned().unwrap_or_default()
}

/// [`Runner`] with English and Chinese calculator steps.
pub fn calculator() -> Runner {
    let mut runner = Runner::new();
    _ = runner
        .before(Event::All, |w, _| w.set("all_results", Vec::<i64>::new()))
        .before(Event::Example, |w, _| {
            w.set("numbers", Vec::<i64>::new());
            _ = w.remove::<i64>("result");
        })
        .after(Event::Example, |w, _| {
            if let Some(result) = w.get::<i64>("result").copied() {
                w.get_or_insert_with("all_results", Vec::new).push(result);
            }
        });

    for pattern in [r"I have entered (\d+) into the calculator", r"我输入(\d+)"] {
        _ = runner
            .step(pattern, |w, ctx| {
                let n = ctx.parse(1)?;
                w.get_or_insert_with("numbers", Vec::<i64>::new).push(n);
                anyhow::Ok(())
            })
            .unwrap();
    }
    for pattern in ["I press add", "我按添加"] {
        _ = runner
            .step(pattern, |w, _| {
                let sum = w
                    .get::<Vec<i64>>("numbers")
                    .map_or(0, |n| n.iter().sum::<i64>());
                w.set("result", sum);
            })
            .unwrap();
    }
    for pattern in [r"the result should be (\d+) on the screen", r"结果应该是(\d+)"] {
        _ = runner
            .step(pattern, |w, ctx| {
                let expected = ctx.parse::<i64>(1)?;
                let actual = w.get::<i64>("result").copied();
                anyhow::ensure!(
                    actual == Some(expected),
                    "expected {expected}, got {actual:?}",
                );
                Ok(())
            })
            .unwrap();
    }

    _ = runner
        .step(r"I press \[\+\]", |w, ctx| ctx.behave_as(w, "When I press add"))
        .unwrap()
        .step("I have entered the numbers", |w, ctx| {
            let table = ctx.table().context("no table given")?;
            for row in table.hashes() {
                let n = row
                    .get("number")
                    .context("no `number` column")?
                    .parse::<i64>()?;
                w.get_or_insert_with("numbers", Vec::<i64>::new).push(n);
            }
            anyhow::Ok(())
        })
        .unwrap();
    runner
}
