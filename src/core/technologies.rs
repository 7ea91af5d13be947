use once_cell::sync::Lazy;
use regex::Regex;

pub const TECHNOLOGY_CATALOG: &[&str] = &[
    "Java", "Spring", "Spring Boot", "Hibernate", "JPA", "JBoss", "Wildfly", "Tomcat",
    "JavaScript", "TypeScript", "React", "Angular", "Vue", "Node.js", "Express",
    "PHP", "Laravel", "Symfony", "CodeIgniter", "WordPress",
    "Python", "Django", "Flask", "FastAPI",
    "C#", ".NET", "ASP.NET", "Entity Framework",
    "Ruby", "Ruby on Rails",
    "Go", "Rust", "Kotlin",
    "HTML", "HTML5", "CSS", "SCSS", "SASS", "Bootstrap", "Tailwind",
    "MySQL", "PostgreSQL", "MongoDB", "Oracle", "SQL Server", "SQLite", "Redis", "MariaDB",
    "Docker", "Kubernetes", "AWS", "Azure", "GCP", "Firebase",
    "REST", "SOAP", "GraphQL", "gRPC", "REST-API", "API",
    "Git", "SVN", "Jenkins", "CircleCI", "GitHub", "GitHub Actions", "GitHub CI/CD", "GitLab",
    "Jira", "Confluence", "Trello", "DevOps", "Scrum", "Kanban", "Agile", "SAFe",
    "jQuery", "Redux", "MobX", "Next.js", "Nuxt.js", "Gatsby",
    "Nginx", "Apache", "Webpack", "Babel", "ESLint",
    "Android", "iOS", "React Native", "Flutter", "Xamarin", "Swift", "Objective-C",
    "WebSockets", "OAuth", "JWT", "SAML", "OpenID Connect", "Microservices", "CI/CD",
    "Magnolia", "AngularJS", "Bitbucket", "Cordova", "Shopware", "NodeJS", "JUnit",
    "JAVA", "SmartGWT", "Windows Server", "OpenCart", "xtCommerce",
    "yii-Framework", "C#.NET", "Silverlight", "DSGVO", "Vaadin",
];

static CATALOG_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    TECHNOLOGY_CATALOG
        .iter()
        .filter_map(|tech| {
            let pattern = format!(r"\b{}\b", regex::escape(&tech.to_lowercase()));
            Regex::new(&pattern).ok().map(|re| (*tech, re))
        })
        .collect()
});

/// Catalog technologies mentioned in `text`, in catalog order.
///
/// Matching is case-insensitive on word boundaries, so "Java" does not fire
/// on "JavaScript" but both "Java" and "JAVA" fire on "java".
pub fn extract_technologies(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    CATALOG_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(&lowered))
        .map(|(tech, _)| *tech)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_boundaries() {
        let found = extract_technologies("We need a JavaScript frontend with React");
        assert!(found.contains(&"JavaScript"));
        assert!(found.contains(&"React"));
        assert!(!found.contains(&"Java"));
    }

    #[test]
    fn test_case_insensitive_and_catalog_order() {
        let found = extract_technologies("laravel backend, spring boot services, DOCKER");
        assert_eq!(found, vec!["Spring", "Spring Boot", "Laravel", "Docker"]);
    }

    #[test]
    fn test_nothing_found() {
        assert!(extract_technologies("a cooking blog").is_empty());
    }
}
