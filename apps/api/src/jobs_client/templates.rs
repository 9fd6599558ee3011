//! Description templates for listings that arrive without a description.
//!
//! The sparse response shape only carries id/title/company/location/date, so a
//! description is synthesized from the title. Keys are matched in order
//! against the lower-cased title; `{company}` is substituted.

const TEMPLATES: &[(&str, &str)] = &[
    (
        "software engineer",
        "We are looking for a Software Engineer to join our team at {company}. You will be responsible for designing, developing, and maintaining software applications. Experience with JavaScript, Python, Java, React, Node.js, Git, Docker, and modern development tools is required. Knowledge of REST APIs, databases, and cloud platforms is preferred.",
    ),
    (
        "frontend",
        "Join {company} as a Frontend Developer and help build amazing user experiences. You'll work with React, JavaScript, TypeScript, Vue.js, Angular, HTML5, CSS3, SASS, Tailwind CSS, Webpack, Jest, and modern frontend frameworks to create responsive and interactive web applications.",
    ),
    (
        "backend",
        "We're seeking a Backend Developer at {company} to build scalable server-side applications. Experience with Node.js, Python, Java, Go, Express, Django, PostgreSQL, MongoDB, Redis, Docker, Kubernetes, AWS, and REST APIs is essential.",
    ),
    (
        "fullstack",
        "Join our team at {company} as a Full Stack Developer. You'll work on both frontend and backend development, using technologies like React, Node.js, Python, TypeScript, PostgreSQL, MongoDB, Docker, AWS, GraphQL, and various modern frameworks.",
    ),
    (
        "data scientist",
        "We're looking for a Data Scientist at {company} to analyze complex datasets and build machine learning models. Experience with Python, R, SQL, Pandas, NumPy, Scikit-learn, TensorFlow, PyTorch, Jupyter, Tableau, and statistical analysis is required.",
    ),
    (
        "devops",
        "Join {company} as a DevOps Engineer to manage our infrastructure and deployment pipelines. Experience with Docker, Kubernetes, AWS, Azure, Terraform, Ansible, Jenkins, GitLab CI, Linux, Bash, and CI/CD tools is essential.",
    ),
    (
        "mobile",
        "We're seeking a Mobile Developer at {company} to build iOS and Android applications. Experience with React Native, Flutter, Swift, Kotlin, Java, Dart, Xcode, Android Studio, and Firebase is required.",
    ),
    (
        "cloud",
        "Join our team at {company} as a Cloud Engineer. You'll work on scalable cloud infrastructure using AWS, Azure, GCP, Docker, Kubernetes, Terraform, Python, Linux, and Infrastructure as Code principles.",
    ),
    (
        "security",
        "We're looking for a Security Engineer at {company} to protect our systems and data. Experience with cybersecurity, penetration testing, network security, Python, Linux, Docker, AWS Security, and compliance frameworks is required.",
    ),
    (
        "ml",
        "Join {company} as an ML Engineer to build machine learning systems. Experience with Python, TensorFlow, PyTorch, Scikit-learn, Pandas, NumPy, Apache Spark, Docker, Kubernetes, and cloud platforms is essential.",
    ),
    (
        "infrastructure",
        "Join our team at {company} as an Infrastructure Engineer. You'll work on scalable systems, cloud platforms, and automation tools. Experience with AWS, Azure, GCP, Docker, Kubernetes, Terraform, and monitoring tools is preferred.",
    ),
    (
        "developer experience",
        "We're looking for a Developer Experience Engineer at {company} to improve our development workflows and tools. Experience with developer tools, CI/CD, internal platforms, Docker, Kubernetes, and automation is required.",
    ),
    (
        "new grad",
        "Join {company} as a New Graduate Software Engineer. This is an excellent opportunity to start your career in tech with mentorship and growth opportunities. Basic knowledge of programming languages and development tools is preferred.",
    ),
    (
        "junior",
        "We're seeking a Junior Developer at {company} to join our growing team. This role offers great learning opportunities and career growth. Experience with at least one programming language and willingness to learn is required.",
    ),
    (
        "entry level",
        "Join {company} as an Entry Level Developer. Perfect for recent graduates or career changers looking to break into tech. Basic programming knowledge and eagerness to learn is essential.",
    ),
];

const DEFAULT_TEMPLATE: &str = "Join {company} as a Software Engineer. You'll work on exciting projects and help build innovative solutions. Experience with modern development practices and technologies is preferred.";

pub fn synthesize_description(title: &str, company: &str) -> String {
    let title = title.to_lowercase();
    let template = TEMPLATES
        .iter()
        .find(|(key, _)| title.contains(key))
        .map(|(_, template)| *template)
        .unwrap_or(DEFAULT_TEMPLATE);

    template.replace("{company}", company)
}
