use chrono::{Datelike, NaiveDate};

// Fixed-date Indonesian public holidays, month-day keyed. Movable feasts
// (Idul Fitri, Waisak) shift year to year and are not modelled here.
const PUBLIC_HOLIDAYS: &[(u32, u32, &str)] = &[
    (1, 1, "Tahun Baru"),
    (3, 29, "Isra Mi'raj"),
    (3, 31, "Hari Raya Nyepi"),
    (4, 18, "Wafat Yesus Kristus"),
    (5, 1, "Hari Buruh"),
    (5, 29, "Kenaikan Yesus Kristus"),
    (6, 1, "Hari Pancasila"),
    (8, 17, "Hari Kemerdekaan"),
    (12, 25, "Hari Natal"),
];

pub(crate) fn public_holiday(date: NaiveDate) -> Option<&'static str> {
    PUBLIC_HOLIDAYS
        .iter()
        .find(|(month, day, _)| date.month() == *month && date.day() == *day)
        .map(|(_, _, name)| *name)
}

/// School holiday season: June and July entirely, December from the 15th.
pub(crate) fn is_school_holiday(date: NaiveDate) -> bool {
    let month = date.month();
    month == 6 || month == 7 || (month == 12 && date.day() >= 15)
}
