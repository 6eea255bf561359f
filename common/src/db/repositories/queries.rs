// SQL column lists shared by the repositories

pub mod template_queries {
    pub const SELECT_ALL_COLUMNS: &str = r#"id, name, template_type, task_definitions,
        trigger_type, trigger_schedule, trigger_lead_days, default_assignee_id,
        emoji, tags, reference_list, bundle_link_definitions, created_at, updated_at"#;
}

pub mod bundle_queries {
    pub const SELECT_ALL_COLUMNS: &str = r#"id, template_id, title, anchor_date, stage, status,
        emoji, tags, reference_list, bundle_link_definitions, created_at"#;
}

pub mod task_queries {
    pub const SELECT_ALL_COLUMNS: &str = r#"id, description, date, status, source, bundle_id,
        recurring_config_id, template_task_ref, assignee_id, instructions_url,
        required_link_name, requires_file, is_milestone, created_at"#;
}

pub mod recurring_queries {
    pub const SELECT_ALL_COLUMNS: &str =
        "id, description, cron_expression, assignee_id, enabled, created_at";
}
