//! Static header/width tables for the spreadsheet pipeline
//!
//! One bidirectional table drives both directions: export writes the Arabic
//! labels in the fixed column order below, import maps labels (and a couple
//! of legacy spelling variants) back to canonical field names. The table is
//! checked for consistency once at startup via [`validate`].

use std::collections::HashMap;

use anyhow::{Result, bail};
use once_cell::sync::Lazy;

/// One spreadsheet column: canonical field, Arabic label, display width in
/// character units
pub struct Column {
    pub field: &'static str,
    pub label: &'static str,
    pub width: f64,
}

const fn col(field: &'static str, label: &'static str, width: f64) -> Column {
    Column {
        field,
        label,
        width,
    }
}

/// Project export columns in sheet order. The registry's spreadsheets are
/// right-to-left, so the order reads rightmost-first.
pub static PROJECT_EXPORT_COLUMNS: [Column; 25] = [
    col("funding_sources", "مصادر التمويل المحتملة", 20.0),
    col("potential_partners", "الشركاء المحتملين", 20.0),
    col("indicator_3", "المؤشر 3", 16.0),
    col("indicator_2", "المؤشر 2", 16.0),
    col("indicator_1", "المؤشر 1", 16.0),
    col("budget_years", "سنوات الميزانية", 16.0),
    col("implementation_years", "سنوات التنفيذ", 16.0),
    col("estimated_duration", "المدة التقديرية (أشهر)", 16.0),
    col("start_year", "سنة الانطلاق", 12.0),
    col("estimated_cost", "التكلفة التقديرية", 16.0),
    col("achievements", "الإنجازات", 24.0),
    col("studies", "الدراسات", 20.0),
    col("property_prep_cost", "كلفة تعبئة العقار", 16.0),
    col("area", "المساحة", 12.0),
    col("property_drawing", "الرسم العقاري", 16.0),
    col("property_status", "وضعية العقار", 16.0),
    col("target_group", "الفئة المستهدفة", 16.0),
    col("components", "مكونات المشروع", 24.0),
    col("planning_code", "الرمز في تصميم التهيئة", 16.0),
    col("district", "المقاطعة/الجماعة", 16.0),
    col("location", "المكان", 16.0),
    col("projects", "المشاريع", 24.0),
    col("program", "البرنامج", 16.0),
    col("code", "الرمز", 8.0),
    col("development_goals", "الأهداف التنموية", 24.0),
];

/// Labels accepted on import that do not appear as export columns:
/// `project_goals` was never exported, and two labels circulated in older
/// files with variant spelling/spacing.
pub static IMPORT_LABEL_ALIASES: [(&str, &str); 3] = [
    ("أهداف المشروع", "project_goals"),
    ("الاهداف التنموية", "development_goals"),
    ("المدة التقديرية(أشهر)", "estimated_duration"),
];

/// Execution-rate export columns in sheet order
pub static RATE_EXPORT_COLUMNS: [Column; 19] = [
    col("code", "رمز المشروع", 16.0),
    col("program", "البرنامج", 16.0),
    col("projects", "المشاريع", 16.0),
    col("programmed_amount", "المبلغ المبرمج", 16.0),
    col("partner_contribution", "تعبئة الشركاء", 16.0),
    col("programming_date", "تاريخ البرمجة", 16.0),
    col("market_launch_date", "تاريخ إطلاق الصفقات", 16.0),
    col("actual_costs", "التكاليف الفعلية (أ)", 16.0),
    col("estimated_costs", "التكاليف التقديرية (ب)", 16.0),
    col("cost_difference_percentage", "فرق التكلفة (%)", 16.0),
    col("expected_end_date", "تاريخ الانتهاء المتوقع", 16.0),
    col("actual_start_date", "تاريخ البداية الفعلية", 16.0),
    col("actual_end_date", "تاريخ الانتهاء الفعلي", 16.0),
    col("duration_difference_days", "فرق المدة (بالأيام)", 16.0),
    col("delay_percentage", "معدل التأخير (%)", 16.0),
    col("work_progress_percentage", "معدل التقدم (%) للأشغال", 16.0),
    col("financial_achievement_percentage", "معدل الإنجاز (%) (مالي)", 16.0),
    col("created_at", "تاريخ الإنشاء", 16.0),
    col("updated_at", "آخر تحديث", 16.0),
];

/// Canonical project fields, in the order the import template lists them
pub static TEMPLATE_FIELDS: [&str; 26] = [
    "code",
    "program",
    "projects",
    "location",
    "district",
    "planning_code",
    "development_goals",
    "components",
    "target_group",
    "project_goals",
    "property_status",
    "property_drawing",
    "area",
    "property_prep_cost",
    "studies",
    "achievements",
    "estimated_cost",
    "start_year",
    "estimated_duration",
    "implementation_years",
    "budget_years",
    "indicator_1",
    "indicator_2",
    "indicator_3",
    "potential_partners",
    "funding_sources",
];

static HEADER_TO_FIELD: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for column in &PROJECT_EXPORT_COLUMNS {
        map.insert(column.label, column.field);
    }
    for (label, field) in IMPORT_LABEL_ALIASES {
        map.insert(label, field);
    }
    map
});

/// Map a spreadsheet header to a canonical field name. Arabic labels map
/// through the table, raw field names pass through; anything else is
/// returned unchanged (and ignored downstream).
pub fn header_to_field(header: &str) -> &str {
    let header = header.trim();
    if let Some(field) = HEADER_TO_FIELD.get(header) {
        return field;
    }
    header
}

/// True for the canonical project field names the importer understands
pub fn is_project_field(name: &str) -> bool {
    TEMPLATE_FIELDS.contains(&name)
}

/// Consistency check run once at startup: the label table must be
/// bijective and must cover every canonical field.
pub fn validate() -> Result<()> {
    let mut seen_labels = HashMap::new();
    for column in &PROJECT_EXPORT_COLUMNS {
        if let Some(previous) = seen_labels.insert(column.label, column.field) {
            bail!(
                "Header table is ambiguous: label {:?} maps to both {} and {}",
                column.label,
                previous,
                column.field
            );
        }
        if !is_project_field(column.field) {
            bail!("Header table references unknown field {}", column.field);
        }
    }
    for (label, field) in IMPORT_LABEL_ALIASES {
        if let Some(previous) = seen_labels.insert(label, field) {
            bail!(
                "Header table is ambiguous: label {:?} maps to both {} and {}",
                label,
                previous,
                field
            );
        }
        if !is_project_field(field) {
            bail!("Header table references unknown field {}", field);
        }
    }

    for field in TEMPLATE_FIELDS {
        if !seen_labels.values().any(|f| *f == field) {
            bail!("Field {} has no import label", field);
        }
    }

    Ok(())
}
