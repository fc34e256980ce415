mod common;

use eucalyptus::{parser, table::Row, Config, Runner};

use self::common::{calculator, feature, results};

const FRENCH: &str = "\
# language: fr
Fonctionnalité: Addition
  Afin d'éviter des erreurs bêtes
  En tant que nul en maths

  Plan du Scénario: Ajouter 2 nombres
    Soit j'ai entré <a> dans la calculatrice
    Et j'ai entré <b> dans la calculatrice
    Quand j'appuie sur ajouter
    Alors le résultat doit être <somme> à l'écran

  Exemples:
    | a  | b | somme |
    | 40 | 2 | 42    |
    | 1  | 1 | 2     |
";

const RUSSIAN: &str = "\
Функционал: Таблицы
  Сценарий: Читаем таблицу
    Допустим у меня есть таблица
      | имя   | возраст |
      | Анна  | 30      |
      | Борис | 25      |
    Тогда всё хорошо
";

const PORTUGUESE: &str = "\
# language: pt
Funcionalidade: Soma
  Esquema do Cenário: Somar dois números
    Dado que eu digitei <a> na calculadora
    E que eu digitei <b> na calculadora
    Quando eu aperto somar
    Então o resultado deve ser <c>

    Cenários:
      | a | b | c |
      | 1 | 2 | 3 |
      | 5 | 5 | 10 |
";

fn french(mut runner: Runner) -> Runner {
    _ = runner
        .step(r"j'ai entré (\d+) dans la calculatrice", |w, ctx| {
            let n = ctx.get(1).unwrap_or_default();
            ctx.behave_as(w, &format!("I have entered {n} into the calculator"))
        })
        .unwrap()
        .step("j'appuie sur ajouter", |w, ctx| ctx.behave_as(w, "I press add"))
        .unwrap()
        .step(r"le résultat doit être (\d+) à l'écran", |w, ctx| {
            let n = ctx.get(1).unwrap_or_default();
            ctx.behave_as(w, &format!("the result should be {n} on the screen"))
        })
        .unwrap();
    runner
}

#[test]
fn runs_chinese() {
    let mut runner = calculator();
    let summary = runner.run_path(feature("calculator_zh.feature")).unwrap();

    assert!(summary.passed());
    assert_eq!(summary.features[0].name, "加法");
    assert_eq!(results(runner.world()), [120]);
}

#[test]
fn reports_chinese_failures() {
    let mut runner = calculator();
    let summary = runner
        .run_path(feature("wrong_expectations_zh.feature"))
        .unwrap();

    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.line, 12);
    assert_eq!(failure.sentence, "那么结果应该是40");
    assert!(failure.to_string().contains("  >   12 | 那么结果应该是40"));

    let summary = runner.run_path(feature("step_not_found_zh.feature")).unwrap();
    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.line, 4);
    assert_eq!(
        failure.error.to_string(),
        r#"The step r"当我开曲速引擎" is not defined"#,
    );
}

#[test]
fn runs_french_outline() {
    let feature = parser::parse(FRENCH, None).unwrap();
    assert_eq!(feature.language, "fr");
    assert_eq!(feature.keyword, "Fonctionnalité");
    assert_eq!(
        feature.description,
        "Afin d'éviter des erreurs bêtes\nEn tant que nul en maths",
    );
    assert_eq!(feature.scenarios[0].steps[1].keyword, "Et ");

    let mut runner = french(calculator());
    let summary = runner.run(&[feature]).unwrap();
    assert!(summary.passed());
    assert_eq!(results(runner.world()), [42, 2]);
}

#[test]
fn runs_russian_table() {
    let mut runner = Runner::new().with_config(Config {
        language: Some("ru".into()),
        ..Config::default()
    });
    _ = runner
        .step("у меня есть таблица", |w, ctx| {
            w.set("rows", ctx.table().map(|t| t.hashes()).unwrap_or_default());
        })
        .unwrap()
        .step("всё хорошо", |_, _| ())
        .unwrap();

    let summary = runner.run_text(RUSSIAN).unwrap();
    assert!(summary.passed());

    let rows = runner.world().get::<Vec<Row>>("rows").unwrap();
    let names = rows
        .iter()
        .map(|r| (r["имя"].as_str(), r["возраст"].as_str()))
        .collect::<Vec<_>>();
    assert_eq!(names, [("Анна", "30"), ("Борис", "25")]);
}

#[test]
fn runs_portuguese_outline() {
    let mut runner = calculator();
    _ = runner
        .step(r"(?:que )?eu digitei (\d+) na calculadora", |w, ctx| {
            let n = ctx.parse::<i64>(1)?;
            w.get_or_insert_with("numbers", Vec::<i64>::new).push(n);
            anyhow::Ok(())
        })
        .unwrap()
        .step("eu aperto somar", |w, ctx| ctx.behave_as(w, "Quando I press add"))
        .unwrap()
        .step(r"o resultado deve ser (\d+)", |w, ctx| {
            let expected = ctx.parse::<i64>(1)?;
            anyhow::ensure!(w.get::<i64>("result") == Some(&expected));
            Ok(())
        })
        .unwrap();

    let summary = runner.run_text(PORTUGUESE).unwrap();
    assert!(summary.passed());
    assert_eq!(summary.scenarios().count(), 2);
    assert_eq!(results(runner.world()), [3, 10]);
}

#[test]
fn rejects_unknown_language() {
    let err = parser::parse("# language: tlh\nFeature: Qapla'\n", None)
        .unwrap_err();
    assert_eq!(err.line, 1);
}
