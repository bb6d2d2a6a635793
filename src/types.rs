use spindle_core::{Recording, TableSource, Task};

/// Raw contents of the picked file, kept so it can be re-parsed when the
/// sampling rate or the sheet changes.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub content: SourceContent,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SourceContent {
    Text(String),
    Workbook { bytes: Vec<u8>, sheets: Vec<String> },
}

impl SourceFile {
    /// Sheet names; empty for delimited text.
    pub fn sheets(&self) -> &[String] {
        match &self.content {
            SourceContent::Text(_) => &[],
            SourceContent::Workbook { sheets, .. } => sheets,
        }
    }

    pub fn table<'a>(&'a self, sheet: Option<&'a str>) -> TableSource<'a> {
        match &self.content {
            SourceContent::Text(text) => TableSource::Delimited(text),
            SourceContent::Workbook { bytes, .. } => TableSource::Workbook { bytes, sheet },
        }
    }

    pub fn size(&self) -> usize {
        match &self.content {
            SourceContent::Text(text) => text.len(),
            SourceContent::Workbook { bytes, .. } => bytes.len(),
        }
    }
}

/// A parsed recording together with the file (and sheet) it came from.
#[derive(Clone, Debug)]
pub struct LoadedFile {
    pub name: String,
    pub sheet: Option<String>,
    pub recording: Recording,
}

impl LoadedFile {
    /// The sheet name for workbooks, else the file name.
    pub fn label(&self) -> &str {
        self.sheet.as_deref().unwrap_or(&self.name)
    }

    /// "channels x samples", matching a table's shape.
    pub fn shape_label(&self) -> String {
        format!("{} channels x {} samples", self.recording.channels().len(), self.recording.len())
    }
}

/// File name for a JSON export of `task` run on `source`.
pub fn export_file_name(source: &str, task: Task, channel: Option<&str>) -> String {
    let stem = source.rsplit_once('.').map_or(source, |(stem, _)| stem);
    let task = match task {
        Task::TotalCount => "total",
        Task::ChannelCounts => "channels",
        Task::Wavelet => "wavelet",
        Task::Epochs => "epochs",
    };
    match channel {
        Some(ch) if !ch.is_empty() => format!("{stem}_{task}_{ch}.json"),
        _ => format!("{stem}_{task}.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::Channel;

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("ecbl.csv", Task::TotalCount, None), "ecbl_total.json");
        assert_eq!(export_file_name("a.b.tsv", Task::Wavelet, Some("Fz")), "a.b_wavelet_Fz.json");
        assert_eq!(export_file_name("noext", Task::Epochs, Some("")), "noext_epochs.json");
    }

    #[test]
    fn test_shape_label() {
        let recording = Recording::new(
            512.0,
            vec![
                Channel { name: "Fz".into(), samples: vec![0.0; 3] },
                Channel { name: "Cz".into(), samples: vec![0.0; 3] },
            ],
        )
        .unwrap();
        let file = LoadedFile { name: "x.csv".into(), sheet: None, recording };
        assert_eq!(file.shape_label(), "2 channels x 3 samples");
        assert_eq!(file.label(), "x.csv");
        let file = LoadedFile { sheet: Some("EOBL".into()), ..file };
        assert_eq!(file.label(), "EOBL");
    }

    #[test]
    fn test_source_tables() {
        let text = SourceFile { name: "a.csv".into(), content: SourceContent::Text("t,Fz\n0,1\n".into()) };
        assert!(text.sheets().is_empty());
        assert!(matches!(text.table(Some("ignored")), TableSource::Delimited(_)));
        assert_eq!(text.size(), 9);

        let book = SourceFile {
            name: "b.xlsx".into(),
            content: SourceContent::Workbook { bytes: vec![1, 2, 3], sheets: vec!["ECBL".into(), "EOBL".into()] },
        };
        assert_eq!(book.sheets(), ["ECBL", "EOBL"]);
        assert!(matches!(book.table(Some("EOBL")), TableSource::Workbook { sheet: Some("EOBL"), .. }));
        assert_eq!(book.size(), 3);
    }
}
