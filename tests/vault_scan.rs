mod support;

use support::TestVault;
use tick::error::Error;
use tick::task::TaskId;
use tick::vault::{rewrite_line, TaskFilter, Vault};

#[test]
fn discovery_walks_nested_directories() {
    let fixture = TestVault::new();
    fixture.write_document("inbox.md", "- [ ] one\n");
    fixture.write_document("projects/deep/nested.md", "- [ ] two\n");
    fixture.write_document("projects/readme.txt", "- [ ] not a document\n");

    let vault = Vault::open(fixture.path()).unwrap();
    let documents = vault.documents().unwrap();
    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|path| path
        .extension()
        .map(|ext| ext == "md")
        .unwrap_or(false)));
}

#[test]
fn extraction_preserves_file_order_and_line_numbers() {
    let fixture = TestVault::new();
    let path = fixture.write_document(
        "notes.md",
        "intro prose\n- [ ] first\n\ntext\n- [x] second ✅ 2024-02-02\n- [ ] third\n",
    );

    let vault = Vault::open(fixture.path()).unwrap();
    let tasks = vault.extract_tasks(&path).unwrap();

    let lines: Vec<usize> = tasks.iter().map(|task| task.line()).collect();
    assert_eq!(lines, vec![2, 5, 6]);
    assert!(tasks.iter().all(|task| task.modified_date().is_some()));
    assert_eq!(tasks[1].raw_content(), "- [x] second ✅ 2024-02-02");
}

#[test]
fn query_concatenates_documents_with_filter() {
    let fixture = TestVault::new();
    fixture.write_document("a.md", "- [ ] open a\n- [x] done a ✅ 2024-02-02\n");
    fixture.write_document("b.md", "- [ ] open b\n");

    let vault = Vault::open(fixture.path()).unwrap();
    assert_eq!(vault.query_tasks(TaskFilter::All).unwrap().len(), 3);
    assert_eq!(vault.query_tasks(TaskFilter::Unchecked).unwrap().len(), 2);
    assert_eq!(vault.query_tasks(TaskFilter::Completed).unwrap().len(), 1);
}

#[test]
fn config_ignore_patterns_apply() {
    let fixture = TestVault::new();
    fixture.write_document("inbox.md", "- [ ] keep\n");
    fixture.write_document("archive/old.md", "- [ ] skip\n");

    let vault = Vault::open(fixture.path())
        .unwrap()
        .with_ignore(&["archive/**".to_string()])
        .unwrap();

    let tasks = vault.query_tasks(TaskFilter::All).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].content(), "keep");
}

#[test]
fn find_task_reports_missing_ids() {
    let fixture = TestVault::new();
    let path = fixture.write_document("inbox.md", "- [ ] here\nplain prose\n");

    let vault = Vault::open(fixture.path()).unwrap();
    assert!(vault.find_task(&TaskId::new(&path, 1)).is_ok());

    // Line exists but holds no task.
    let err = vault.find_task(&TaskId::new(&path, 2)).unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(_)));

    // Document does not exist.
    let missing = fixture.path().join("absent.md");
    let err = vault.find_task(&TaskId::new(missing, 1)).unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(_)));
}

#[test]
fn rewrite_past_last_line_performs_no_write() {
    let fixture = TestVault::new();
    let before = "- [ ] one\n- [ ] two\n";
    let path = fixture.write_document("inbox.md", before);

    // The trailing newline yields a final empty slot, so line 4 is the
    // first truly out-of-range number.
    let err = rewrite_line(&path, 4, "- [x] phantom").unwrap_err();
    assert!(matches!(
        err,
        Error::LineOutOfBounds {
            line: 4,
            line_count: 3,
            ..
        }
    ));
    assert_eq!(fixture.read_document("inbox.md"), before);

    let err = rewrite_line(&path, 0, "- [x] phantom").unwrap_err();
    assert!(matches!(err, Error::LineOutOfBounds { line: 0, .. }));
    assert_eq!(fixture.read_document("inbox.md"), before);
}

#[test]
fn rewrite_touches_only_the_addressed_line() {
    let fixture = TestVault::new();
    let path = fixture.write_document("inbox.md", "# Head\n- [ ] target\ntail\n");

    rewrite_line(&path, 2, "- [x] target ✅ 2024-02-02").unwrap();
    assert_eq!(
        fixture.read_document("inbox.md"),
        "# Head\n- [x] target ✅ 2024-02-02\ntail\n"
    );
}
