//! Dashboard controller: load, mutate, derive.
//!
//! Owns the two in-memory collections (a cache valid until the next full
//! reload), the calendar view, and the API clients. All state transitions go
//! through `&mut self`, so operations are serialized by the borrow checker;
//! there is no concurrent writer and no lock.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::api::records::RecordsClient;
use crate::api::ApiConfig;
use crate::calendar::{self, bin_by_date, CalendarView, ViewMode};
use crate::error::DashboardError;
use crate::reference;
use crate::schema::{self, AppMeta};
use crate::types::{
    palette_color, Config, EmployeeFields, Record, Role, ShiftFields, ShiftType,
};

/// Display fallback when a shift references an employee that is no longer in
/// the loaded collection.
pub const UNKNOWN_EMPLOYEE: &str = "Unbekannt";

/// One shift joined to its (possibly unresolved) employee, ready to render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub record_id: String,
    pub shift_type: Option<ShiftType>,
    pub employee_name: String,
    pub employee_color: Option<String>,
}

/// One calendar cell. A day with zero assignments is "uncovered", a
/// first-class state, flagged rather than merely left empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub assignments: Vec<ShiftAssignment>,
    pub uncovered: bool,
}

/// Aggregate statistics, recomputed from the collections on demand; there
/// is no memoized copy that could diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub shifts_this_week: usize,
    pub shifts_this_month: usize,
    pub employee_count: usize,
    pub uncovered_days_this_month: usize,
}

/// Pure derivation of the dashboard statistics for a given "today".
pub fn compute_stats(
    employees: &[Record<EmployeeFields>],
    shifts: &[Record<ShiftFields>],
    today: NaiveDate,
) -> DashboardStats {
    let (week_start, week_end) = calendar::week_range(today);

    let dates: Vec<Option<NaiveDate>> = shifts
        .iter()
        .map(|s| {
            s.fields
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        })
        .collect();

    let shifts_this_week = dates
        .iter()
        .flatten()
        .filter(|d| **d >= week_start && **d <= week_end)
        .count();
    let shifts_this_month = dates
        .iter()
        .flatten()
        .filter(|d| d.format("%Y-%m").to_string() == today.format("%Y-%m").to_string())
        .count();
    let uncovered_days_this_month = calendar::month_days(today)
        .into_iter()
        .filter(|day| !dates.iter().flatten().any(|d| d == day))
        .count();

    DashboardStats {
        shifts_this_week,
        shifts_this_month,
        employee_count: employees.len(),
        uncovered_days_this_month,
    }
}

/// Build the render model for one date: shifts bound to the day, each joined
/// to its employee. Unresolved references degrade to a fallback label.
pub fn build_day_cell(
    date: NaiveDate,
    shifts: &[Record<ShiftFields>],
    employees: &[Record<EmployeeFields>],
) -> DayCell {
    let assignments: Vec<ShiftAssignment> =
        bin_by_date(shifts, |f: &ShiftFields| f.date.as_deref(), date)
        .into_iter()
        .map(|shift| {
            let employee = reference::resolve(shift.fields.employee.as_deref(), employees);
            ShiftAssignment {
                record_id: shift.record_id.clone(),
                shift_type: shift.fields.shift_type,
                employee_name: employee
                    .and_then(|e| e.fields.name.clone())
                    .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_string()),
                employee_color: employee.and_then(|e| e.fields.color.clone()),
            }
        })
        .collect();

    DayCell {
        date,
        uncovered: assignments.is_empty(),
        assignments,
    }
}

/// The shift-planner dashboard: collections, view window, and API access.
pub struct Dashboard {
    employees_api: RecordsClient<EmployeeFields>,
    shifts_api: RecordsClient<ShiftFields>,
    employee_meta: AppMeta,
    shift_meta: AppMeta,
    base_url: String,
    pub employees: Vec<Record<EmployeeFields>>,
    pub shifts: Vec<Record<ShiftFields>>,
    pub view: CalendarView,
}

impl Dashboard {
    /// Wire up clients and metadata. No network traffic until [`load`].
    ///
    /// [`load`]: Dashboard::load
    pub fn new(config: &Config) -> Self {
        let api = Arc::new(ApiConfig::new(&config.base_url, config.api_key.clone()));
        let employees_app_url = format!("{}/apps/{}", api.base_url, config.employees_app_id);
        Dashboard {
            employees_api: RecordsClient::new(api.clone(), &config.employees_app_id),
            shifts_api: RecordsClient::new(api.clone(), &config.shifts_app_id),
            employee_meta: schema::employees_meta(&config.employees_app_id),
            shift_meta: schema::shifts_meta(&config.shifts_app_id, &employees_app_url),
            base_url: api.base_url.clone(),
            employees: Vec::new(),
            shifts: Vec::new(),
            view: CalendarView::today(ViewMode::Week),
        }
    }

    /// Fetch both collections concurrently. Both must succeed or the loaded
    /// state is left untouched (no partial render).
    pub async fn load(&mut self) -> Result<(), DashboardError> {
        let (employees, shifts) =
            tokio::join!(self.employees_api.list_all(), self.shifts_api.list_all());
        let employees = employees?;
        let shifts = shifts?;

        log::info!(
            "dashboard loaded: {} employees, {} shifts",
            employees.len(),
            shifts.len()
        );
        self.employees = employees;
        self.shifts = shifts;
        Ok(())
    }

    fn validate(&self, meta: &AppMeta, fields: impl Serialize) -> Result<(), DashboardError> {
        let value = serde_json::to_value(fields)
            .map_err(|e| DashboardError::Validation(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| DashboardError::Validation("fields must be an object".to_string()))?;
        schema::validate_fields(meta, object)?;
        Ok(())
    }

    /// Create an employee. The palette color is chosen by creation order and
    /// stored in the record so later reordering never repaints anyone. On
    /// success the collection is refetched in full; the create response is
    /// not merged locally, keeping server-side defaults authoritative.
    pub async fn create_employee(
        &mut self,
        name: &str,
        role: Option<Role>,
    ) -> Result<(), DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::Validation(
                "employee name must not be empty".to_string(),
            ));
        }

        let fields = EmployeeFields {
            name: Some(name.to_string()),
            role,
            color: Some(palette_color(self.employees.len()).to_string()),
        };
        self.validate(&self.employee_meta, &fields)?;

        self.employees_api.create(&fields).await?;
        self.employees = self.employees_api.list_all().await?;
        Ok(())
    }

    /// Create a shift for a calendar date. The employee relationship is
    /// written as a reference url; the selected employee must exist in the
    /// loaded collection. Full refetch on success, as with employees.
    pub async fn create_shift(
        &mut self,
        date: NaiveDate,
        employee_id: &str,
        shift_type: ShiftType,
    ) -> Result<(), DashboardError> {
        if employee_id.is_empty() {
            return Err(DashboardError::Validation(
                "an employee must be selected".to_string(),
            ));
        }
        if !self.employees.iter().any(|e| e.record_id == employee_id) {
            return Err(DashboardError::Validation(format!(
                "no loaded employee with id {}",
                employee_id
            )));
        }

        let fields = ShiftFields {
            date: Some(date.format("%Y-%m-%d").to_string()),
            employee: Some(reference::record_url(
                &self.base_url,
                self.employees_api.app_id(),
                employee_id,
            )),
            shift_type: Some(shift_type),
        };
        self.validate(&self.shift_meta, &fields)?;

        self.shifts_api.create(&fields).await?;
        self.shifts = self.shifts_api.list_all().await?;
        Ok(())
    }

    /// Delete a shift, optimistically: the record leaves the local list
    /// before the request goes out, so the UI updates without a round trip.
    /// If the remote delete fails, the record is reinserted at its old
    /// position and the error returned, so the cache never stays diverged
    /// from the server.
    pub async fn delete_shift(&mut self, record_id: &str) -> Result<(), DashboardError> {
        let Some(pos) = self.shifts.iter().position(|r| r.record_id == record_id) else {
            return Err(DashboardError::Validation(format!(
                "no loaded shift with id {}",
                record_id
            )));
        };

        let removed = self.shifts.remove(pos);
        if let Err(e) = self.shifts_api.remove(record_id).await {
            log::warn!("shift delete failed, restoring {}: {}", record_id, e);
            let pos = pos.min(self.shifts.len());
            self.shifts.insert(pos, removed);
            return Err(e.into());
        }
        Ok(())
    }

    /// Statistics for the current local date.
    pub fn stats(&self) -> DashboardStats {
        compute_stats(
            &self.employees,
            &self.shifts,
            chrono::Local::now().date_naive(),
        )
    }

    /// Render model for every date in the visible range.
    pub fn day_cells(&self) -> Vec<DayCell> {
        self.view
            .visible_days()
            .into_iter()
            .map(|date| build_day_cell(date, &self.shifts, &self.employees))
            .collect()
    }
}
