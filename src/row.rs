//! Flattening of filtered devices into sheet rows.

use crate::filter::ActiveDevice;

/// Number of columns every row occupies.
pub const COLUMN_COUNT: usize = 9;

/// Header labels for row 1, in column order.
pub const HEADER: [&str; COLUMN_COUNT] = [
    "Serial Number",
    "Friendly Number",
    "User Name",
    "Model",
    "OS Version",
    "Last Seen",
    "Enrollment Status",
    "Compliance Status",
    "Compromised Status",
];

/// Length of the OS family prefix stripped from `OperatingSystem`.
const OS_PREFIX_LEN: usize = 5;

/// One device, ready to write. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    /// `SerialNumber`.
    pub serial_number: String,
    /// `FriendlyNumber`.
    pub friendly_number: String,
    /// `UserName`.
    pub user_name: String,
    /// `Model`.
    pub model: String,
    /// See [`os_version`].
    pub os_version: String,
    /// Calendar date of `LastSeen` in the record's own offset, `YYYY-MM-DD`.
    pub last_seen_date: String,
    /// `EnrollmentStatus`.
    pub enrollment_status: String,
    /// `ComplianceStatus`.
    pub compliance_status: String,
    /// `CompromisedStatus`.
    pub compromised_status: String,
}

impl OutputRow {
    /// The row as cells, in column order.
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.serial_number,
            self.friendly_number,
            self.user_name,
            self.model,
            self.os_version,
            self.last_seen_date,
            self.enrollment_status,
            self.compliance_status,
            self.compromised_status,
        ]
    }
}

/// Drops the first five characters of the OS name and appends `.build`.
///
/// This is literal prefix stripping: `"Windows 10.0.19045"` and `"3803"`
/// give `"ws 10.0.19045.3803"`, and two missing inputs give `"."`.
pub fn os_version(operating_system: Option<&str>, build_version: Option<&str>) -> String {
    let os: String = operating_system
        .unwrap_or_default()
        .chars()
        .skip(OS_PREFIX_LEN)
        .collect();
    format!("{os}.{}", build_version.unwrap_or_default())
}

/// Maps one filtered device to its row. Pure and total.
pub fn format_row(device: &ActiveDevice) -> OutputRow {
    let r = &device.record;
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    OutputRow {
        serial_number: text(&r.serial_number),
        friendly_number: text(&r.friendly_number),
        user_name: text(&r.user_name),
        model: text(&r.model),
        os_version: os_version(r.operating_system.as_deref(), r.os_build_version.as_deref()),
        last_seen_date: device.last_seen.date_naive().format("%Y-%m-%d").to_string(),
        enrollment_status: text(&r.enrollment_status),
        compliance_status: text(&r.compliance_status),
        compromised_status: text(&r.compromised_status),
    }
}

/// [`format_row`] over a slice, order preserved.
pub fn format_rows(devices: &[ActiveDevice]) -> Vec<OutputRow> {
    devices.iter().map(format_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceRecord;
    use crate::filter::{filter_recent, parse_last_seen};
    use chrono::{Duration, NaiveDateTime};

    fn active(record: DeviceRecord, last_seen: &str) -> ActiveDevice {
        ActiveDevice {
            record,
            last_seen: parse_last_seen(last_seen).unwrap(),
        }
    }

    #[test]
    fn os_version_strips_five_chars_and_appends_build() {
        assert_eq!(
            os_version(Some("WindowsNT"), Some("1.0.0")),
            "wsNT.1.0.0"
        );
        assert_eq!(
            os_version(Some("Windows 10.0.19045"), Some("3803")),
            "ws 10.0.19045.3803"
        );
    }

    #[test]
    fn os_version_handles_missing_parts() {
        assert_eq!(os_version(None, Some("12345")), ".12345");
        assert_eq!(os_version(Some("Windows 11"), None), "ws 11.");
        assert_eq!(os_version(None, None), ".");
    }

    #[test]
    fn os_version_short_name_becomes_empty() {
        assert_eq!(os_version(Some("Win"), Some("1")), ".1");
    }

    #[test]
    fn format_row_fills_all_columns_in_order() {
        let record = DeviceRecord {
            serial_number: Some("SN1".into()),
            friendly_number: Some("LAPTOP-1".into()),
            user_name: Some("jdoe".into()),
            model: Some("Surface Pro".into()),
            platform: Some("WinRT".into()),
            operating_system: Some("Windows 10.0.22631".into()),
            os_build_version: Some("2861".into()),
            last_seen: Some("2024-01-10 08:00:00".into()),
            enrollment_status: Some("Enrolled".into()),
            compliance_status: Some("Compliant".into()),
            compromised_status: Some("false".into()),
        };
        let row = format_row(&active(record, "2024-01-10 08:00:00"));
        assert_eq!(
            row.into_cells(),
            vec![
                "SN1",
                "LAPTOP-1",
                "jdoe",
                "Surface Pro",
                "ws 10.0.22631.2861",
                "2024-01-10",
                "Enrolled",
                "Compliant",
                "false",
            ]
        );
    }

    #[test]
    fn format_row_renders_missing_fields_empty() {
        let row = format_row(&active(DeviceRecord::default(), "2024-02-29 23:59:59"));
        assert_eq!(row.last_seen_date, "2024-02-29");
        assert_eq!(row.os_version, ".");
        assert!(row.serial_number.is_empty());
        assert_eq!(row.into_cells().len(), COLUMN_COUNT);
    }

    #[test]
    fn date_column_keeps_the_recorded_day_for_offset_timestamps() {
        // 01:00 at +05:00 is 20:00 UTC on the 9th.
        let record = DeviceRecord {
            serial_number: Some("SN1".into()),
            platform: Some("WinRT".into()),
            last_seen: Some("2024-01-10T01:00:00+05:00".into()),
            ..Default::default()
        };
        let now = NaiveDateTime::parse_from_str("2024-01-20 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let outcome = filter_recent(vec![record], "WinRT", Duration::days(14), now);
        let rows = format_rows(&outcome.retained);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_seen_date, "2024-01-10");
    }

    #[test]
    fn format_rows_keeps_order() {
        let devices = vec![
            active(
                DeviceRecord {
                    serial_number: Some("b".into()),
                    ..Default::default()
                },
                "2024-01-01 00:00:00",
            ),
            active(
                DeviceRecord {
                    serial_number: Some("a".into()),
                    ..Default::default()
                },
                "2024-01-02 00:00:00",
            ),
        ];
        let rows = format_rows(&devices);
        assert_eq!(rows[0].serial_number, "b");
        assert_eq!(rows[1].serial_number, "a");
        assert_eq!(format_rows(&devices), rows, "formatting must be deterministic");
    }
}
