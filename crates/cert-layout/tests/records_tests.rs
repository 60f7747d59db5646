use cert_layout::*;

#[tokio::test]
async fn test_load_records_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("class.csv");
    std::fs::write(
        &path,
        "first_name,last_name,course_time,course_date\n\
         John,Doe,4 hr,2024-03-02\n\
         Jane,Roe,8 hr,\n",
    )
    .unwrap();

    let records = load_records_csv(&path).await.unwrap();
    assert_eq!(records.len(), 2);

    let resolver = VariableResolver::new(&default_variables());
    let vars = resolver.resolve(&records[0]);
    assert_eq!(vars["firstName"], VariableValue::text("John"));
    assert_eq!(vars["courseDate"], VariableValue::text("03/02/2024"));
    assert!(vars["courseTime4hr"].is_true());
    assert!(!vars["courseTime8hr"].is_true());

    let vars = resolver.resolve(&records[1]);
    assert!(vars["courseTime8hr"].is_true());
    assert!(!vars.contains_key("courseDate"));
}

#[tokio::test]
async fn test_load_records_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("class.json");
    std::fs::write(
        &path,
        r#"[
            { "studentName": "JOHN DOE", "certificateNumber": 123 },
            { "studentName": "JANE ROE", "courseTime": "6 hr" }
        ]"#,
    )
    .unwrap();

    let records = load_records_json(&path).await.unwrap();
    assert_eq!(records.len(), 2);

    let resolver = VariableResolver::new(&default_variables());
    let vars = resolver.resolve(&records[0]);
    assert_eq!(vars["certificateNumber"], VariableValue::text("123"));
    let vars = resolver.resolve(&records[1]);
    assert!(vars["courseTime6hr"].is_true());
}

#[tokio::test]
async fn test_missing_records_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_records_csv(dir.path().join("missing.csv")).await;
    assert!(matches!(result, Err(CertError::Io(_))));
}
