//! Plain-text report rendering.

use minijinja::{Environment, context};

use super::workload::{ReportingError, ReportingResult};
use crate::reporting::domain::WorkloadReport;

const TEXT_TEMPLATE: &str = "\
Workload report generated {{ report.generated_at }}
{% if report.window %}
Window: {{ report.window.start }} to {{ report.window.end }}
{% endif %}
Tasks: {{ report.tasks.total }} (pending {{ report.tasks.pending }}, in progress {{ report.tasks.in_progress }}, completed {{ report.tasks.completed }}, cancelled {{ report.tasks.cancelled }})
Subtasks: {{ report.subtasks.total }} (pending {{ report.subtasks.pending }}, in progress {{ report.subtasks.in_progress }}, completed {{ report.subtasks.completed }}, cancelled {{ report.subtasks.cancelled }})
Completion rate: {{ report.completion_rate_percent }}%
{% if report.completed_in_window is not none %}
Completed in window: {{ report.completed_in_window }}
{% endif %}
Overdue: {{ report.overdue | length }}
{% if report.unassigned_subtasks %}
Unassigned subtasks: {{ report.unassigned_subtasks }}
{% endif %}
{% if report.assignees %}

Assignees:
{% for row in report.assignees %}
  {{ row.display_name or row.assignee }}: open {{ row.open }}, completed {{ row.completed }}, overdue {{ row.overdue }}
{% endfor %}
{% endif %}
{% if report.overdue %}

Overdue items:
{% for item in report.overdue %}
  {{ item.external_id }} {{ item.title }} (due {{ item.due_date }})
{% endfor %}
{% endif %}
";

/// Renders `report` as plain text.
///
/// # Errors
///
/// Returns [`ReportingError::Render`] when the template fails to render.
pub fn render_text(report: &WorkloadReport) -> ReportingResult<String> {
    let mut environment = Environment::new();
    environment.set_trim_blocks(true);
    environment.set_lstrip_blocks(true);
    environment
        .render_str(TEXT_TEMPLATE, context! { report => report })
        .map_err(|error| ReportingError::Render(error.to_string()))
}
