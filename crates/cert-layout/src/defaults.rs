//! Starter template used when a new certificate is created

use crate::template::*;
use crate::types::*;

/// Variable catalog shared by the starter template
pub fn default_variables() -> Vec<VariableDef> {
    vec![
        VariableDef::new("studentName", "Student Name", "JOHN DOE"),
        VariableDef::new("firstName", "First Name", "JOHN"),
        VariableDef::new("lastName", "Last Name", "DOE"),
        VariableDef::new("licenseNumber", "License Number", "D1234567"),
        VariableDef::new("birthDate", "Date of Birth", "01/15/2007"),
        VariableDef::new("courseDate", "Course Date", "03/02/2024"),
        VariableDef::new("certificateNumber", "Certificate Number", "000123"),
        VariableDef::new("instructorName", "Instructor", "JANE SMITH"),
        VariableDef::new("schoolName", "School", "Affordable Driving School"),
        VariableDef::new("courseTime", "Course Time", "4 hr").with_options(&["4 hr", "6 hr", "8 hr"]),
    ]
}

/// Portrait Letter, one certificate per page, white background.
pub fn default_template() -> Template {
    let mut template = Template::blank(PageSize::default());
    template.name = "Certificate of Completion".to_string();
    template.available_variables = default_variables();

    template.shape_elements.push(
        ShapeElement::rectangle("frame", 20.0, 20.0, 572.0, 752.0).with_border("#1f2937", 2.0),
    );

    let mut title = TextElement::new("title", "Certificate of Completion", 306.0, 90.0, 28.0);
    title.align = Align::Center;
    title.font_weight = Some("bold".to_string());
    template.text_elements.push(title);

    let mut school = TextElement::new("school", "{{schoolName}}", 306.0, 130.0, 16.0);
    school.align = Align::Center;
    template.text_elements.push(school);

    let mut name = TextElement::new("student", "{{studentName}}", 306.0, 250.0, 24.0);
    name.align = Align::Center;
    name.underline = true;
    template.text_elements.push(name);

    template.text_elements.extend([
        TextElement::new("license", "License #: {{licenseNumber}}", 80.0, 330.0, 12.0),
        TextElement::new("birth", "Date of Birth: {{birthDate}}", 80.0, 355.0, 12.0),
        TextElement::new("date", "Completed: {{courseDate}}", 80.0, 380.0, 12.0),
        TextElement::new("number", "Certificate #: {{certificateNumber}}", 360.0, 330.0, 12.0),
        TextElement::new("instructor", "Instructor: {{instructorName}}", 360.0, 355.0, 12.0),
    ]);

    // One checkbox per course length, each with an X mark bound to its flag
    for (i, option) in ["4hr", "6hr", "8hr"].iter().enumerate() {
        let x = 80.0 + i as f32 * 120.0;
        let y = 440.0;
        template.shape_elements.push(
            ShapeElement::rectangle(&format!("box-{}", option), x, y, 12.0, 12.0)
                .with_border("#000000", 1.0),
        );
        template.shape_elements.push(ShapeElement::line(
            &format!("checkbox-courseTime{}-true", option),
            x,
            y,
            x + 12.0,
            y + 12.0,
        ));
        template.shape_elements.push(ShapeElement::line(
            &format!("checkbox-courseTime{}-true-b", option),
            x + 12.0,
            y,
            x,
            y + 12.0,
        ));
        template.text_elements.push(TextElement::new(
            &format!("label-{}", option),
            &option.replace("hr", " hr course"),
            x + 18.0,
            y + 1.0,
            11.0,
        ));
    }

    template
}
