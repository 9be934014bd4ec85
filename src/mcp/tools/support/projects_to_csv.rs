use crate::azure::projects::Project;

/// Converts projects to CSV format.
/// Columns: id, name, state, visibility
pub fn projects_to_csv(projects: &[Project]) -> Result<String, String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["id", "name", "state", "visibility"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for project in projects {
        wtr.write_record([
            project.id.as_str(),
            project.name.as_str(),
            project.state.as_str(),
            project.visibility.as_deref().unwrap_or(""),
        ])
        .map_err(|e| format!("Failed to write CSV row: {}", e))?;
    }

    let csv_bytes = wtr
        .into_inner()
        .map_err(|e| format!("Failed to get CSV bytes: {}", e))?;

    String::from_utf8(csv_bytes).map_err(|e| format!("Failed to convert CSV to string: {}", e))
}
