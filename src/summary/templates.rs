use crate::config::Locale;

/// Fixed labels for one display language.
pub struct Labels {
    pub manual_heading: &'static str,
    pub upload_heading: &'static str,
    pub explanation_heading: &'static str,
    pub preview_heading: &'static str,
    pub precipitation: &'static str,
    pub soil_type: &'static str,
    pub slope_angle: &'static str,
    pub vegetation_cover: &'static str,
    pub mean_precipitation: &'static str,
    pub max_slope_angle: &'static str,
    pub mean_vegetation_cover: &'static str,
    pub degrees: &'static str,
    pub reply_heading: &'static str,
}

const EN: Labels = Labels {
    manual_heading: "Landslide factor analysis",
    upload_heading: "Automatic assessment",
    explanation_heading: "Explanation",
    preview_heading: "File contents",
    precipitation: "Precipitation",
    soil_type: "Soil type",
    slope_angle: "Slope angle",
    vegetation_cover: "Vegetation cover",
    mean_precipitation: "Average precipitation",
    max_slope_angle: "Maximum slope angle",
    mean_vegetation_cover: "Average vegetation cover",
    degrees: "degrees",
    reply_heading: "Reply",
};

const ZH: Labels = Labels {
    manual_heading: "滑坡易发性因素分析",
    upload_heading: "自动判别结果",
    explanation_heading: "基于滑坡因素的解释",
    preview_heading: "文件内容",
    precipitation: "降雨量",
    soil_type: "土壤类型",
    slope_angle: "坡度角",
    vegetation_cover: "植被覆盖率",
    mean_precipitation: "平均降雨量",
    max_slope_angle: "最大坡度角",
    mean_vegetation_cover: "平均植被覆盖率",
    degrees: "度",
    reply_heading: "回复",
};

pub fn for_locale(locale: Locale) -> &'static Labels {
    match locale {
        Locale::En => &EN,
        Locale::Zh => &ZH,
    }
}

pub fn manual_sentence(locale: Locale, precipitation: &str, slope: &str, soil: &str, vegetation: &str) -> String {
    match locale {
        Locale::En => format!(
            "With {precipitation} mm of precipitation, a {slope} degree slope, {soil} soil and \
             {vegetation}% vegetation cover, landslide susceptibility may be high. More rainfall \
             or less vegetation cover could raise the landslide risk further."
        ),
        Locale::Zh => format!(
            "在降雨量为 {precipitation} 毫米、坡度为 {slope} 度、{soil} 土壤和 {vegetation}% 的植被覆盖率下，\
             滑坡易发性可能较高。增加降雨量或减少植被覆盖率可能会进一步提高滑坡风险。"
        ),
    }
}

pub fn upload_sentence(locale: Locale, precipitation: &str, slope: &str, vegetation: &str) -> String {
    match locale {
        Locale::En => format!(
            "Based on the uploaded data, average precipitation is {precipitation} mm, the maximum \
             slope angle is {slope} degrees and average vegetation cover is {vegetation}%. These \
             factors indicate a high landslide risk."
        ),
        Locale::Zh => format!(
            "根据上传的数据，平均降雨量为 {precipitation} 毫米，最大坡度角为 {slope} 度，\
             平均植被覆盖率为 {vegetation}%。这些因素表明滑坡风险较高。"
        ),
    }
}
