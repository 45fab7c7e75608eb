use std::fs;
use std::path::Path;

use anagram_corpus::LoadMode;
use anagram_types::OutputRecord;
use anagrams::{JobConfig, OutputFormat, SUCCESS_MARKER, part_name, run_job};

fn write_corpus(dir: &Path, files: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, text) in files {
        fs::write(dir.join(name), text).unwrap();
    }
}

fn read_records(output: &Path, reducers: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for idx in 0..reducers {
        let text = fs::read_to_string(output.join(part_name(idx))).unwrap();
        lines.extend(text.lines().map(str::to_string));
    }
    lines.sort();
    lines
}

#[tokio::test]
async fn groups_words_across_partitions() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    write_corpus(
        &input,
        &[
            ("part-00000", "Listen to the cat.\n"),
            ("part-00001", "Silent night; enlist now!\r\ndog act\n"),
            ("part-00002", "god abc123 cba"),
            ("_ignored", "tinsel inlets"),
        ],
    );

    let summary = run_job(JobConfig::new(&input, &output)).await.unwrap();
    assert_eq!(summary.partitions, 3);
    assert_eq!(summary.stats.numeric, 1);
    assert_eq!(summary.records, 3);
    assert!(output.join(SUCCESS_MARKER).exists());
    assert!(!output.join("_temporary").exists());
    assert_eq!(
        read_records(&output, 1),
        vec![
            "act\t[act, cat]",
            "dgo\t[dog, god]",
            "eilnst\t[enlist, listen, silent]",
        ]
    );
}

#[tokio::test]
async fn skip_file_filters_words() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus.txt");
    fs::write(&input, "listen silent enlist cat").unwrap();
    let skip = tmp.path().join("lists").join("skip.txt");
    fs::create_dir_all(skip.parent().unwrap()).unwrap();
    fs::write(&skip, "silent,the\n").unwrap();
    let output = tmp.path().join("out");

    let config = JobConfig::new(&input, &output).with_skip_file(&skip);
    let summary = run_job(config).await.unwrap();
    assert_eq!(summary.stats.skipped, 1);
    assert_eq!(read_records(&output, 1), vec!["eilnst\t[enlist, listen]"]);
}

#[tokio::test]
async fn missing_skip_file_does_not_fail_the_job() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus.txt");
    fs::write(&input, "dog god").unwrap();
    let output = tmp.path().join("out");

    let config = JobConfig::new(&input, &output).with_skip_file(tmp.path().join("nope.txt"));
    let summary = run_job(config).await.unwrap();
    assert_eq!(summary.records, 1);
    assert!(output.join(SUCCESS_MARKER).exists());
}

#[tokio::test]
async fn missing_input_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("out");
    let err = run_job(JobConfig::new(tmp.path().join("absent"), &output))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("absent"));
    assert!(!output.exists());
}

#[tokio::test]
async fn existing_output_is_refused() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus.txt");
    fs::write(&input, "dog god").unwrap();
    let output = tmp.path().join("out");
    fs::create_dir(&output).unwrap();

    let err = run_job(JobConfig::new(&input, &output)).await.unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert!(!output.join(SUCCESS_MARKER).exists());
}

#[tokio::test]
async fn reducers_split_keys_without_losing_any() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    write_corpus(
        &input,
        &[
            ("a", "stop pots tops\nlisten silent\n"),
            ("b", "dog god act cat\nevil live vile\n"),
        ],
    );
    let output = tmp.path().join("out");

    let mut config = JobConfig::new(&input, &output);
    config.reducers = 3;
    config.workers = 2;
    config.load_mode = LoadMode::Owned;
    let summary = run_job(config).await.unwrap();
    assert_eq!(summary.files.len(), 3);
    assert_eq!(summary.records, 5);
    assert_eq!(
        read_records(&output, 3),
        vec![
            "act\t[act, cat]",
            "dgo\t[dog, god]",
            "eilnst\t[listen, silent]",
            "eilv\t[evil, live, vile]",
            "opst\t[pots, stop, tops]",
        ]
    );
}

#[tokio::test]
async fn json_output_ignores_separator() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus.txt");
    fs::write(&input, "dog god").unwrap();
    let output = tmp.path().join("out");

    let mut config = JobConfig::new(&input, &output);
    config.format = OutputFormat::Json;
    config.separator = "|".to_string();
    run_job(config).await.unwrap();

    let text = fs::read_to_string(output.join(part_name(0))).unwrap();
    let record: OutputRecord = serde_json::from_str(text.trim_end()).unwrap();
    assert_eq!(record.key.as_str(), "dgo");
    assert_eq!(record.words, vec!["dog", "god"]);
}

#[tokio::test]
async fn custom_separator_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus.txt");
    fs::write(&input, "stop pots").unwrap();
    let output = tmp.path().join("out");

    let mut config = JobConfig::new(&input, &output);
    config.separator = " => ".to_string();
    run_job(config).await.unwrap();

    let text = fs::read_to_string(output.join(part_name(0))).unwrap();
    let record = OutputRecord::parse_line(text.trim_end(), " => ").unwrap();
    assert_eq!(record.words, vec!["pots", "stop"]);
}
